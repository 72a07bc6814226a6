/// The canonical month names, in calendar order.
pub const MONTHS_ORDER: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// Returns the zero-based calendar position of `month`, or `None` when it is not one of the
/// canonical names. The comparison is exact.
pub fn month_index(month: &str) -> Option<usize> {
    MONTHS_ORDER.iter().position(|&m| m == month)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_index() {
        assert_eq!(month_index("Enero"), Some(0));
        assert_eq!(month_index("Diciembre"), Some(11));
        assert_eq!(month_index("enero"), None);
        assert_eq!(month_index(""), None);
    }
}
