//! Plain-text views. Category names are resolved at render time.

use libris_db::{Book, Category};

/// Names of a book's categories; ids with no matching category print as-is.
pub fn category_names(book: &Book, categories: &[Category]) -> Vec<String> {
    book.categories
        .iter()
        .map(|id| {
            categories
                .iter()
                .find(|category| category.id == *id)
                .map(|category| category.name.clone())
                .unwrap_or_else(|| id.to_string())
        })
        .collect()
}

pub fn book_summary(book: &Book, categories: &[Category]) -> String {
    format!(
        "Title: {}\nCategories: {}",
        book.title,
        category_names(book, categories).join(", ")
    )
}

pub fn category_line(category: &Category) -> String {
    format!("{}\t{}", category.id, category.name)
}
