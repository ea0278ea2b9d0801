/// `total / count`, or 0.0 when there is nothing to divide by.
pub fn ratio(total: f64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    total / count as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio() {
        assert_eq!(ratio(10.0, 4), 2.5);
        assert_eq!(ratio(10.0, 0), 0.0);
    }
}
