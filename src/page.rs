// Copyright (c) 2025 - Cowboy AI, Inc.
//! Page requests and result pages

use serde::{Deserialize, Serialize};

use crate::errors::{AssociationError, AssociationResult};

/// Validated `(page_index, items_per_page)` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    pub page_index: u32,
    pub items_per_page: u32,
}

impl PageRequest {
    /// Default page size applied by callers that omit one
    pub const DEFAULT_ITEMS_PER_PAGE: u32 = 15;

    /// Validate caller supplied values before any external call
    ///
    /// # Errors
    /// - InvalidInput for a negative index or a non-positive page size
    pub fn new(page_index: i64, items_per_page: i64) -> AssociationResult<Self> {
        if page_index < 0 {
            return Err(AssociationError::InvalidInput(format!(
                "page_index must not be negative, got {}",
                page_index
            )));
        }
        if items_per_page <= 0 {
            return Err(AssociationError::InvalidInput(format!(
                "items_per_page must be positive, got {}",
                items_per_page
            )));
        }
        let page_index = u32::try_from(page_index)
            .map_err(|_| AssociationError::InvalidInput("page_index too large".to_string()))?;
        let items_per_page = u32::try_from(items_per_page)
            .map_err(|_| AssociationError::InvalidInput("items_per_page too large".to_string()))?;

        Ok(Self {
            page_index,
            items_per_page,
        })
    }

    /// First page of the default size
    pub fn first() -> Self {
        Self {
            page_index: 0,
            items_per_page: Self::DEFAULT_ITEMS_PER_PAGE,
        }
    }

    /// Number of items preceding this page
    pub fn offset(&self) -> usize {
        self.page_index as usize * self.items_per_page as usize
    }

    pub fn next(&self) -> Self {
        Self {
            page_index: self.page_index + 1,
            ..*self
        }
    }
}

/// One page of a larger query result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page
    pub content: Vec<T>,
    /// Size of the whole query, not of this page
    pub total_results: u64,
    /// Request that produced this page
    pub request: PageRequest,
}

impl<T> Page<T> {
    /// Cut one page out of an already ordered, fully materialized result
    pub fn from_ordered(items: Vec<T>, request: PageRequest) -> Self {
        let total_results = items.len() as u64;
        let content = items
            .into_iter()
            .skip(request.offset())
            .take(request.items_per_page as usize)
            .collect();

        Self {
            content,
            total_results,
            request,
        }
    }

    pub fn total_pages(&self) -> u64 {
        total_pages(self.total_results, self.request.items_per_page)
    }

    /// Whether no page follows this one
    pub fn is_last(&self) -> bool {
        u64::from(self.request.page_index) + 1 >= self.total_pages()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_results: self.total_results,
            request: self.request,
        }
    }
}

/// `ceil(total_results / items_per_page)`
pub fn total_pages(total_results: u64, items_per_page: u32) -> u64 {
    let per_page = u64::from(items_per_page.max(1));
    total_results.div_ceil(per_page)
}
