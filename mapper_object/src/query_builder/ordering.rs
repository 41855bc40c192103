//! Sort direction and order terms

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    /// Lenient parse of a caller-supplied direction; anything but DESC sorts ascending
    pub fn parse(direction: &str) -> Self {
        if direction.trim().eq_ignore_ascii_case("desc") {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }
}

/// One ORDER BY entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderTerm {
    Column { column: String, direction: SortOrder },
    Random,
}

impl OrderTerm {
    /// `rand()` in any letter case requests random ordering
    pub fn new(order_by: &str, direction: SortOrder) -> Self {
        if is_random(order_by) {
            OrderTerm::Random
        } else {
            OrderTerm::Column {
                column: order_by.to_string(),
                direction,
            }
        }
    }
}

pub(crate) fn is_random(order_by: &str) -> bool {
    let compact: String = order_by.chars().filter(|c| !c.is_whitespace()).collect();
    compact.eq_ignore_ascii_case("rand()") || compact.eq_ignore_ascii_case("rand")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_direction() {
        assert_eq!(SortOrder::parse("desc"), SortOrder::Desc);
        assert_eq!(SortOrder::parse(" DESC "), SortOrder::Desc);
        assert_eq!(SortOrder::parse("ASC"), SortOrder::Asc);
        assert_eq!(SortOrder::parse("sideways"), SortOrder::Asc);
    }

    #[test]
    fn test_random_detection() {
        assert_eq!(OrderTerm::new("RAND()", SortOrder::Asc), OrderTerm::Random);
        assert_eq!(OrderTerm::new("rand( )", SortOrder::Desc), OrderTerm::Random);
        assert_eq!(
            OrderTerm::new("sortorder", SortOrder::Desc),
            OrderTerm::Column {
                column: "sortorder".to_string(),
                direction: SortOrder::Desc
            }
        );
    }
}
