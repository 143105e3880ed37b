use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    /// Page number, default 1
    pub page: Option<u64>,
    /// Items per page, default 20, max 100
    pub per_page: Option<u64>,
}

/// Normalized pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u64,
    pub per_page: u64,
    pub offset: u64,
}

impl Pagination {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }

    pub fn normalize(&self) -> Page {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        // Databases take a signed 64-bit OFFSET.
        let offset = (page - 1).saturating_mul(per_page).min(i64::MAX as u64);
        Page {
            page,
            per_page,
            offset,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortBy {
    CreatedAt,
    Price,
    Name,
}

macro_rules! paginated {
    ($ty:ident) => {
        impl $ty {
            pub fn pagination(&self) -> Pagination {
                Pagination {
                    page: self.page,
                    per_page: self.per_page,
                }
            }
        }
    };
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Substring match on name or description
    pub q: Option<String>,
    pub category_id: Option<i32>,
    pub brand: Option<String>,
    #[param(value_type = Option<String>)]
    #[schema(value_type = Option<String>)]
    pub min_price: Option<rust_decimal::Decimal>,
    #[param(value_type = Option<String>)]
    #[schema(value_type = Option<String>)]
    pub max_price: Option<rust_decimal::Decimal>,
    #[param(inline)]
    pub sort_by: Option<ProductSortBy>,
    #[param(inline)]
    pub sort_order: Option<SortOrder>,
}
paginated!(ProductQuery);

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub status: Option<String>,
    #[param(inline)]
    pub sort_order: Option<SortOrder>,
}
paginated!(OrderListQuery);

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderItemQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub order_id: Option<i32>,
}
paginated!(OrderItemQuery);

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LowStockQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Stock at or below this value is reported, default 5
    pub threshold: Option<i32>,
}
paginated!(LowStockQuery);

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LogQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub table_name: Option<String>,
    pub user_id: Option<i32>,
}
paginated!(LogQuery);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_defaults_to_first_page_of_twenty() {
        let page = Pagination::default().normalize();
        assert_eq!(
            page,
            Page {
                page: 1,
                per_page: 20,
                offset: 0
            }
        );
    }

    #[test]
    fn normalize_clamps_out_of_range_values() {
        let page = Pagination::new(0, 1000).normalize();
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 100);

        let page = Pagination::new(3, 10).normalize();
        assert_eq!(page.offset, 20);
    }

    #[test]
    fn huge_page_numbers_saturate_the_offset() {
        let page = Pagination::new(u64::MAX, 100).normalize();
        assert_eq!(page.page, u64::MAX);
        assert_eq!(page.offset, i64::MAX as u64);
    }
}
