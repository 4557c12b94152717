mod common;

use chantier::table::{Column, SortDirection, TableView, page_window, total_pages, PageItem};
use common::{materials, row};
use pretty_assertions::assert_eq;
use serde_json::Value;

fn columns() -> Vec<Column> {
    vec![
        Column::new("nom", "Name"),
        Column::new("quantiteStock", "Stock"),
    ]
}

fn names(view: &mut TableView, data: &[chantier::resource::Row]) -> Vec<String> {
    view.view(data, &columns())
        .rows
        .iter()
        .filter_map(|r| r.get("nom").and_then(Value::as_str).map(str::to_string))
        .collect()
}

#[test]
fn clearing_search_restores_first_page() {
    let data: Vec<_> = materials(15).into_iter().map(row).collect();
    let mut view = TableView::new();
    let initial = names(&mut view, &data);

    view.set_search("m1");
    assert_eq!(names(&mut view, &data).len(), 6);
    view.set_search("");
    assert_eq!(names(&mut view, &data), initial);
    assert_eq!(view.page(), 1);
}

#[test]
fn three_clicks_sort_asc_desc_asc() {
    let mut view = TableView::new();
    let mut seen = Vec::new();
    for _ in 0..3 {
        view.toggle_sort("quantiteStock");
        seen.push(view.sort().map(|s| s.direction));
    }
    assert_eq!(
        seen,
        vec![
            Some(SortDirection::Ascending),
            Some(SortDirection::Descending),
            Some(SortDirection::Ascending)
        ]
    );
}

#[test]
fn pages_are_clamped() {
    let data: Vec<_> = materials(23).into_iter().map(row).collect();
    let mut view = TableView::new();
    let pages = total_pages(data.len());
    assert_eq!(pages, 3);

    view.set_page(9, pages);
    assert_eq!(view.view(&data, &columns()).page, 3);
    view.set_page(0, pages);
    assert_eq!(view.page(), 1);
    view.set_page(-4, pages);
    assert_eq!(view.page(), 1);
    assert_eq!(total_pages(0), 0);
    assert_eq!(total_pages(10), 1);
    assert_eq!(total_pages(11), 2);
}

#[test]
fn search_narrows_then_page_resets() {
    let data: Vec<_> = materials(23).into_iter().map(row).collect();
    let mut view = TableView::new();
    view.set_page(3, 3);
    view.set_search("m2");
    let page = view.view(&data, &columns());
    assert_eq!(page.page, 1);
    assert_eq!(page.matched, 4);
}

#[test]
fn long_ranges_use_ellipsis() {
    assert_eq!(
        page_window(1, 8),
        vec![
            PageItem::Page(1),
            PageItem::Page(2),
            PageItem::Page(3),
            PageItem::Ellipsis,
            PageItem::Page(6),
            PageItem::Page(7),
            PageItem::Page(8),
        ]
    );
}
