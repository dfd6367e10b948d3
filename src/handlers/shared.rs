use serde::{Deserialize, Serialize};

/// Envelope for successful responses. Error responses use the flat
/// {code, message, timestamp} body rendered by AppError.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn success_with_message(data: Option<T>, message: &str) -> Self {
        Self {
            success: true,
            data,
            message: Some(message.to_string()),
        }
    }
}

/// page/size query parameters with the original API's defaults.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub page: i64,
    pub size: i64,
}

impl Page {
    pub fn from_params(page: Option<i64>, size: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            size: size.unwrap_or(20).clamp(1, 100),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub size: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: i64, page: Page) -> Self {
        Self {
            data,
            total,
            page: page.page,
            size: page.size,
            total_pages: (total + page.size - 1) / page.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn page_params_clamp_to_sane_bounds() {
        let page = Page::from_params(None, None);
        assert_eq!((page.page, page.size), (1, 20));

        let page = Page::from_params(Some(0), Some(10_000));
        assert_eq!((page.page, page.size), (1, 100));

        let page = Page::from_params(Some(3), Some(50));
        assert_eq!((page.page, page.size), (3, 50));
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = Page::from_params(Some(1), Some(20));
        assert_eq!(Paginated::new(vec![1, 2, 3], 41, page).total_pages, 3);
        assert_eq!(Paginated::new(Vec::<i32>::new(), 0, page).total_pages, 0);
        assert_eq!(Paginated::new(vec![1], 20, page).total_pages, 1);
    }

    #[test]
    fn success_envelope_shape() {
        let value = serde_json::to_value(ApiResponse::success(7)).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"], 7);
        assert_eq!(value["message"], serde_json::Value::Null);
    }
}
