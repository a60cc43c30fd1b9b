//! Unit tests for the push converter

#[cfg(test)]
mod tests {
    use crate::engine::ConverterType;
    use crate::push::PushConverter;

    fn ramp(frames: usize, channels: usize) -> Vec<f32> {
        (0..frames * channels)
            .map(|i| (i / channels) as f32 / frames as f32)
            .collect()
    }

    #[test]
    fn test_accessors() {
        let converter = PushConverter::new(ConverterType::Linear, 2, 1.5);
        assert_eq!(converter.converter_type(), ConverterType::Linear);
        assert_eq!(converter.channels(), 2);
        assert_eq!(converter.ratio(), 1.5);
    }

    #[test]
    fn test_flush_on_fresh_converter_is_empty() {
        let mut converter = PushConverter::new(ConverterType::SincFastest, 1, 2.0);
        let output: Vec<f32> = converter.flush().unwrap();
        assert!(output.is_empty());
    }

    #[test]
    fn test_flush_is_idempotent() {
        let mut converter = PushConverter::new(ConverterType::Linear, 1, 0.5);

        let mut produced: Vec<f32> = converter.convert(&ramp(64, 1)).unwrap();
        produced.extend(converter.flush::<f32>().unwrap());
        assert!(!produced.is_empty());

        // No input since the last flush, so there is nothing left to drain.
        let again: Vec<f32> = converter.flush().unwrap();
        assert!(again.is_empty());
    }

    #[test]
    fn test_session_is_reusable_after_flush() {
        let mut converter = PushConverter::new(ConverterType::Linear, 2, 0.5);
        let input = ramp(64, 2);

        let mut first: Vec<f32> = converter.convert(&input).unwrap();
        first.extend(converter.flush::<f32>().unwrap());

        let mut second: Vec<f32> = converter.convert(&input).unwrap();
        second.extend(converter.flush::<f32>().unwrap());

        // The flush reset the converter, so the second stream sees the
        // exact same state the first one did.
        assert_eq!(first, second);
    }

    #[test]
    fn test_split_input_is_carried_over() {
        let input = ramp(64, 2);

        let mut whole = PushConverter::new(ConverterType::SincFastest, 2, 0.9);
        let mut reference: Vec<f32> = whole.convert(&input).unwrap();
        reference.extend(whole.flush::<f32>().unwrap());

        let mut split = PushConverter::new(ConverterType::SincFastest, 2, 0.9);
        let mut output: Vec<f32> = Vec::new();
        for chunk in input.chunks(10 * 2) {
            output.extend(split.convert::<f32, f32>(chunk).unwrap());
        }
        output.extend(split.flush::<f32>().unwrap());

        assert_eq!(output, reference);
    }

    #[test]
    fn test_clone_produces_identical_output() {
        let input = ramp(128, 1);
        let (head, tail) = input.split_at(40);

        let mut original = PushConverter::new(ConverterType::SincMediumQuality, 1, 1.5);
        let prefix: Vec<f32> = original.convert(head).unwrap();

        let mut copy = original.clone();

        let mut from_original = prefix.clone();
        from_original.extend(original.convert::<f32, f32>(tail).unwrap());
        from_original.extend(original.flush::<f32>().unwrap());

        let mut from_copy = prefix;
        from_copy.extend(copy.convert::<f32, f32>(tail).unwrap());
        from_copy.extend(copy.flush::<f32>().unwrap());

        assert_eq!(from_original, from_copy);
    }

    #[test]
    fn test_integer_output_path() {
        let mut converter = PushConverter::new(ConverterType::Linear, 1, 1.0);
        let mut output: Vec<i16> = converter.convert(&ramp(32, 1)).unwrap();
        output.extend(converter.flush::<i16>().unwrap());
        assert!(!output.is_empty());
        // A 0..1 ramp stays in the non-negative half of the i16 range.
        assert!(output.iter().all(|&s| s >= 0));
    }

    #[test]
    #[should_panic]
    fn test_zero_channels_panics() {
        let _ = PushConverter::new(ConverterType::Linear, 0, 1.0);
    }
}
