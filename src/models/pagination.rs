//! `from`/`size` paging shared by every listing endpoint

use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::{AppError, AppResult};

/// Query parameters for paged listings
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Index of the first wanted element (default 0)
    pub from: Option<i64>,
    /// Page size (default from configuration)
    pub size: Option<i64>,
}

impl PageParams {
    pub fn resolve(&self, default_size: i64) -> AppResult<Page> {
        Page::new(self.from.unwrap_or(0), self.size.unwrap_or(default_size))
    }
}

/// A validated page window.
///
/// `from` selects the page that contains it: the window starts at
/// `(from / size) * size`, not at `from` itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    from: i64,
    size: i64,
}

impl Page {
    pub fn new(from: i64, size: i64) -> AppResult<Self> {
        if from < 0 || size <= 0 {
            return Err(AppError::Validation(
                "from must be >= 0 and size must be > 0".to_string(),
            ));
        }
        Ok(Self { from, size })
    }

    /// SQL OFFSET value
    pub fn offset(&self) -> i64 {
        (self.from / self.size) * self.size
    }

    /// SQL LIMIT value
    pub fn limit(&self) -> i64 {
        self.size
    }
}
