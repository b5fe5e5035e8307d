// src/common/pagination.rs

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use utoipa::ToSchema;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_WINDOW_RADIUS: u32 = 2;

/// Página e tamanho pedidos pelo chamador (`page`, `page_size` na query string).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, page_size: DEFAULT_PAGE_SIZE }
    }
}

impl PageRequest {
    /// Lê `page` e `page_size` dos parâmetros. Valores inválidos caem no padrão.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let page = params
            .get("page")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);
        let page_size = params
            .get("page_size")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|s| *s >= 1)
            .map(|s| s.min(MAX_PAGE_SIZE))
            .unwrap_or(DEFAULT_PAGE_SIZE);
        Self { page, page_size }
    }

    /// Ajusta a página para o intervalo válido, dado o total de itens.
    pub fn clamp(self, total_items: i64) -> Self {
        let total_pages = total_pages(total_items, self.page_size);
        Self { page: self.page.clamp(1, total_pages), ..self }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.page_size)
    }
}

/// Sempre pelo menos uma página, mesmo sem itens.
pub fn total_pages(total_items: i64, page_size: u32) -> u32 {
    if total_items <= 0 || page_size == 0 {
        return 1;
    }
    let size = i64::from(page_size);
    u32::try_from((total_items + size - 1) / size).unwrap_or(u32::MAX)
}

/// Janela deslizante de páginas ao redor da atual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageWindow {
    pub pages: Vec<u32>,
    pub show_first: bool,
    pub show_last: bool,
    pub show_first_ellipsis: bool,
    pub show_last_ellipsis: bool,
}

impl PageWindow {
    pub fn new(current: u32, total: u32, radius: u32) -> Self {
        let total = total.max(1);
        let current = current.clamp(1, total);

        let mut start = current.saturating_sub(radius).max(1);
        let mut end = (current + radius).min(total);

        // Perto das bordas, desloca a janela para manter 2*radius+1 páginas.
        let span = radius * 2;
        if end - start < span {
            if start == 1 {
                end = (start + span).min(total);
            } else {
                start = end.saturating_sub(span).max(1);
            }
        }

        Self {
            pages: (start..=end).collect(),
            show_first: start > 1,
            show_last: end < total,
            show_first_ellipsis: start > 2,
            show_last_ellipsis: end + 1 < total,
        }
    }
}

/// Páginas "elididas": as duas primeiras, as duas últimas e a atual +-2.
pub fn visible_pages(current: u32, total: u32) -> Vec<u32> {
    let total = total.max(1);
    let mut pages = BTreeSet::new();
    for p in [1, 2, total.saturating_sub(1), total] {
        if (1..=total).contains(&p) {
            pages.insert(p);
        }
    }
    for p in current.saturating_sub(2)..=current.saturating_add(2) {
        if (1..=total).contains(&p) {
            pages.insert(p);
        }
    }
    pages.into_iter().collect()
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u32,
    pub page_size: u32,
    pub total_items: i64,
    pub total_pages: u32,
    pub has_previous: bool,
    pub has_next: bool,
    pub window: PageWindow,
    pub visible_pages: Vec<u32>,
}

impl PageMeta {
    pub fn new(request: PageRequest, total_items: i64) -> Self {
        let total_pages = total_pages(total_items, request.page_size);
        let page = request.page.clamp(1, total_pages);
        Self {
            page,
            page_size: request.page_size,
            total_items: total_items.max(0),
            total_pages,
            has_previous: page > 1,
            has_next: page < total_pages,
            window: PageWindow::new(page, total_pages, DEFAULT_WINDOW_RADIUS),
            visible_pages: visible_pages(page, total_pages),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_items: i64) -> Self {
        Self { items, meta: PageMeta::new(request, total_items) }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page { items: self.items.into_iter().map(f).collect(), meta: self.meta }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_in_the_middle_has_both_ellipses() {
        let w = PageWindow::new(5, 10, 2);
        assert_eq!(w.pages, vec![3, 4, 5, 6, 7]);
        assert!(w.show_first && w.show_last);
        assert!(w.show_first_ellipsis && w.show_last_ellipsis);
    }

    #[test]
    fn window_smaller_than_radius_shows_everything() {
        let w = PageWindow::new(1, 3, 2);
        assert_eq!(w.pages, vec![1, 2, 3]);
        assert!(!w.show_first && !w.show_last);
        assert!(!w.show_first_ellipsis && !w.show_last_ellipsis);
    }

    #[test]
    fn window_shifts_at_the_edges() {
        assert_eq!(PageWindow::new(1, 10, 2).pages, vec![1, 2, 3, 4, 5]);
        let last = PageWindow::new(10, 10, 2);
        assert_eq!(last.pages, vec![6, 7, 8, 9, 10]);
        assert!(last.show_first && last.show_first_ellipsis);
        assert!(!last.show_last && !last.show_last_ellipsis);
    }

    #[test]
    fn window_next_to_the_first_page_has_no_ellipsis() {
        let w = PageWindow::new(5, 10, 2);
        assert!(w.show_first_ellipsis);
        let w = PageWindow::new(4, 10, 1);
        assert_eq!(w.pages, vec![3, 4, 5]);
        assert!(w.show_first);
        assert!(w.show_first_ellipsis);
        let w = PageWindow::new(3, 10, 1);
        assert_eq!(w.pages, vec![2, 3, 4]);
        assert!(w.show_first);
        assert!(!w.show_first_ellipsis);
    }

    #[test]
    fn elided_pages_keep_both_ends() {
        assert_eq!(visible_pages(6, 12), vec![1, 2, 4, 5, 6, 7, 8, 11, 12]);
        assert_eq!(visible_pages(1, 1), vec![1]);
    }

    #[test]
    fn request_parsing_is_lenient() {
        let mut params = HashMap::new();
        params.insert("page".to_string(), "abc".to_string());
        params.insert("page_size".to_string(), "500".to_string());
        let req = PageRequest::from_params(&params);
        assert_eq!(req, PageRequest { page: 1, page_size: MAX_PAGE_SIZE });
    }

    #[test]
    fn out_of_range_page_is_clamped() {
        let req = PageRequest { page: 9, page_size: 10 }.clamp(25);
        assert_eq!(req.page, 3);
        assert_eq!(req.offset(), 20);
        let meta = PageMeta::new(PageRequest::default(), 0);
        assert_eq!(meta.total_pages, 1);
        assert!(!meta.has_next && !meta.has_previous);
    }
}
