// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Pagination
//!
//! Page sizes, page counts and next links follow from
//! `(total_results, page_index, items_per_page)` alone, and walking every
//! page reproduces the full ordered result.

use proptest::prelude::*;

use company_associations::page::{total_pages, Page, PageRequest};
use company_associations::projection::{page_links, paged_list, ListScope};

fn request() -> impl Strategy<Value = PageRequest> {
    (0i64..30, 1i64..40).prop_map(|(index, size)| PageRequest::new(index, size).unwrap())
}

proptest! {
    /// Property: A page holds min(size, remaining) items
    #[test]
    fn prop_page_size(total in 0usize..300, request in request()) {
        let items: Vec<usize> = (0..total).collect();
        let page = Page::from_ordered(items, request);

        let remaining = total.saturating_sub(request.offset());
        prop_assert_eq!(page.content.len(), remaining.min(request.items_per_page as usize));
        prop_assert_eq!(page.total_results, total as u64);
    }

    /// Property: total_pages is the ceiling of total / size
    #[test]
    fn prop_total_pages_is_ceiling(total in 0u64..10_000, size in 1u32..500) {
        let pages = total_pages(total, size);
        prop_assert!(pages * u64::from(size) >= total);
        if pages > 0 {
            prop_assert!((pages - 1) * u64::from(size) < total);
        }
    }

    /// Property: next is empty exactly on and past the last page
    #[test]
    fn prop_next_link_presence(total in 0u64..300, request in request()) {
        let links = page_links("/associations", request, total);
        let last = u64::from(request.page_index) + 1 >= total_pages(total, request.items_per_page);

        prop_assert_eq!(links.next.is_empty(), last);
        prop_assert_eq!(
            links.self_link,
            format!(
                "/associations?page_index={}&items_per_page={}",
                request.page_index, request.items_per_page
            )
        );
    }

    /// Property: Concatenating every page yields the original order
    #[test]
    fn prop_pages_cover_result(total in 0usize..200, size in 1i64..25) {
        let items: Vec<usize> = (0..total).collect();
        let mut walked = Vec::new();
        let mut request = PageRequest::new(0, size).unwrap();

        loop {
            let list = paged_list(Page::from_ordered(items.clone(), request), &ListScope::All);
            walked.extend(list.items);
            if !list.links.has_next() {
                break;
            }
            request = request.next();
        }

        prop_assert_eq!(walked, items);
    }
}
