//! Spreadsheet rendering of menu reports.
//!
//! Rows are emitted depth-first with no separators: a menu row, then each of
//! its submenus followed immediately by that submenu's dishes. Each level is
//! shifted one column to the right of its parent.

use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet, XlsxError};
use thiserror::Error;

use crate::application::report::MenuReport;

pub const SHEET_NAME: &str = "Menu";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const COLUMN_WIDTHS: [f64; 6] = [5.0, 15.0, 35.0, 35.0, 70.0, 10.0];
const HEADER_FILL: u32 = 0xCCCCCC;
/// Row capacity of a single xlsx worksheet.
const MAX_SHEET_ROWS: usize = 1_048_576;

#[derive(Debug, Error)]
pub enum SpreadsheetError {
    #[error(transparent)]
    Xlsx(#[from] XlsxError),
    #[error("report needs {rows} rows but a worksheet holds at most 1048576")]
    TooManyRows { rows: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStyle {
    Menu,
    Submenu,
    Dish,
}

impl RowStyle {
    fn first_column(self) -> u16 {
        match self {
            RowStyle::Menu => 0,
            RowStyle::Submenu => 1,
            RowStyle::Dish => 2,
        }
    }
}

/// One worksheet row: a 1-based index followed by text cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    pub style: RowStyle,
    pub index: usize,
    pub values: Vec<String>,
}

impl SheetRow {
    pub fn first_column(&self) -> u16 {
        self.style.first_column()
    }
}

pub fn layout_rows(menus: &[MenuReport]) -> Vec<SheetRow> {
    let mut rows = Vec::new();
    for (menu_index, menu) in menus.iter().enumerate() {
        rows.push(SheetRow {
            style: RowStyle::Menu,
            index: menu_index + 1,
            values: vec![menu.title.clone(), menu.description.clone()],
        });
        for (submenu_index, submenu) in menu.submenus.iter().enumerate() {
            rows.push(SheetRow {
                style: RowStyle::Submenu,
                index: submenu_index + 1,
                values: vec![submenu.title.clone(), submenu.description.clone()],
            });
            for (dish_index, dish) in submenu.dishes.iter().enumerate() {
                rows.push(SheetRow {
                    style: RowStyle::Dish,
                    index: dish_index + 1,
                    values: vec![
                        dish.title.clone(),
                        dish.description.clone(),
                        dish.price.clone(),
                    ],
                });
            }
        }
    }
    rows
}

struct RowFormats {
    menu: Format,
    submenu: Format,
    dish: Format,
}

impl RowFormats {
    fn new() -> Self {
        let base = Format::new()
            .set_border(FormatBorder::Thin)
            .set_text_wrap()
            .set_font_size(11.0);
        Self {
            menu: base
                .clone()
                .set_bold()
                .set_font_size(12.0)
                .set_background_color(Color::RGB(HEADER_FILL)),
            submenu: base.clone().set_bold(),
            dish: base,
        }
    }

    fn for_style(&self, style: RowStyle) -> &Format {
        match style {
            RowStyle::Menu => &self.menu,
            RowStyle::Submenu => &self.submenu,
            RowStyle::Dish => &self.dish,
        }
    }
}

/// Render the report and save it to `path`.
pub fn write_menu_workbook(menus: &[MenuReport], path: &Path) -> Result<(), SpreadsheetError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    render_sheet(worksheet, menus)?;
    workbook.save(path)?;
    Ok(())
}

fn render_sheet(worksheet: &mut Worksheet, menus: &[MenuReport]) -> Result<(), SpreadsheetError> {
    worksheet.set_name(SHEET_NAME)?;
    for (column, width) in (0u16..).zip(COLUMN_WIDTHS) {
        worksheet.set_column_width(column, width)?;
    }

    let rows = layout_rows(menus);
    ensure_fits(rows.len())?;

    let formats = RowFormats::new();
    for (row_number, row) in (0u32..).zip(&rows) {
        let format = formats.for_style(row.style);

        for column in (0u16..).take(COLUMN_WIDTHS.len()) {
            worksheet.write_blank(row_number, column, format)?;
        }

        let first = row.first_column();
        worksheet.write_number_with_format(row_number, first, row.index as f64, format)?;
        for (column, value) in (first + 1..).zip(&row.values) {
            worksheet.write_string_with_format(row_number, column, value, format)?;
        }
    }
    Ok(())
}

fn ensure_fits(rows: usize) -> Result<(), SpreadsheetError> {
    if rows > MAX_SHEET_ROWS {
        return Err(SpreadsheetError::TooManyRows { rows });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::report::{DishReport, SubmenuReport};

    fn sample() -> Vec<MenuReport> {
        vec![
            MenuReport {
                title: "Lunch".into(),
                description: "Mid-day".into(),
                submenus: vec![
                    SubmenuReport {
                        title: "Soups".into(),
                        description: "Hot soups".into(),
                        dishes: vec![
                            DishReport {
                                title: "Borscht".into(),
                                description: "Beet soup".into(),
                                price: "5.50".into(),
                            },
                            DishReport {
                                title: "Shchi".into(),
                                description: "Cabbage soup".into(),
                                price: "4.00".into(),
                            },
                        ],
                    },
                    SubmenuReport {
                        title: "Drinks".into(),
                        description: String::new(),
                        dishes: Vec::new(),
                    },
                ],
            },
            MenuReport {
                title: "Dinner".into(),
                description: "Evening".into(),
                submenus: Vec::new(),
            },
        ]
    }

    #[test]
    fn rows_follow_depth_first_order_without_gaps() {
        let rows = layout_rows(&sample());
        let shape: Vec<(RowStyle, usize, u16)> = rows
            .iter()
            .map(|row| (row.style, row.index, row.first_column()))
            .collect();

        assert_eq!(
            shape,
            vec![
                (RowStyle::Menu, 1, 0),
                (RowStyle::Submenu, 1, 1),
                (RowStyle::Dish, 1, 2),
                (RowStyle::Dish, 2, 2),
                (RowStyle::Submenu, 2, 1),
                (RowStyle::Menu, 2, 0),
            ]
        );
        assert_eq!(rows[2].values, vec!["Borscht", "Beet soup", "5.50"]);
    }

    #[test]
    fn empty_report_has_no_rows() {
        assert!(layout_rows(&[]).is_empty());
    }

    #[test]
    fn row_count_is_checked_against_the_sheet_limit() {
        assert!(ensure_fits(MAX_SHEET_ROWS).is_ok());
        assert!(matches!(
            ensure_fits(MAX_SHEET_ROWS + 1),
            Err(SpreadsheetError::TooManyRows { rows }) if rows == MAX_SHEET_ROWS + 1
        ));
    }
}
