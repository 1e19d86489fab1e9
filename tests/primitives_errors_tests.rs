use dtm_rs::{DtmError, ErrorKind};

#[test]
fn test_error_kinds() {
    assert_eq!(DtmError::NotFitted.kind(), ErrorKind::UnfittedState);
    assert_eq!(DtmError::InvalidK(0).kind(), ErrorKind::InvalidParameter);
    assert_eq!(DtmError::InvalidOrder(-1.0).kind(), ErrorKind::InvalidParameter);
    assert_eq!(
        DtmError::TooFewReferencePoints { got: 2, k: 3 }.kind(),
        ErrorKind::InvalidParameter
    );
    assert_eq!(
        DtmError::TooFewColumns { got: 1, k: 2 }.kind(),
        ErrorKind::DimensionMismatch
    );
    assert_eq!(
        DtmError::NonSquareDistanceMatrix { rows: 2, columns: 3 }.kind(),
        ErrorKind::DimensionMismatch
    );
    assert_eq!(DtmError::EmptyInput.kind(), ErrorKind::InvalidInput);
    assert_eq!(
        DtmError::InvalidNumericValue("x[0][0]=NaN".into()).kind(),
        ErrorKind::InvalidInput
    );
}

#[test]
fn test_error_display() {
    assert_eq!(DtmError::EmptyInput.to_string(), "Input arrays are empty");
    assert_eq!(
        DtmError::InvalidK(0).to_string(),
        "Invalid k: 0 (must be at least 1)"
    );
    assert_eq!(
        DtmError::DimensionMismatch { expected: 2, got: 3 }.to_string(),
        "Dimension mismatch: expected 2 columns, got 3"
    );
    assert_eq!(
        DtmError::DuplicateParameter { parameter: "q" }.to_string(),
        "Parameter 'q' was set multiple times. Each parameter can only be configured once."
    );
    assert_eq!(
        DtmError::UnknownMetric("cosine".into()).to_string(),
        "Unknown metric: 'cosine'"
    );
}

#[test]
fn test_error_is_std_error() {
    fn takes_error(_: &dyn std::error::Error) {}
    takes_error(&DtmError::NotFitted);
}
