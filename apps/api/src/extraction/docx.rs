use std::path::Path;

use docx_rs::{
    DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCellContent, TableChild,
    TableRowChild,
};

use super::ExtractError;

/// Converts a Word package to text, one line per paragraph. Table cells are
/// read row by row. Legacy binary `.doc` files are not OOXML packages and fail
/// to parse.
pub(super) fn extract(path: &Path) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path).map_err(|source| ExtractError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let docx = docx_rs::read_docx(&bytes).map_err(|e| ExtractError::Word(e.to_string()))?;

    let mut text = String::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(p) => push_paragraph(&mut text, p),
            DocumentChild::Table(t) => push_table(&mut text, t),
            _ => {}
        }
    }
    Ok(text)
}

fn push_paragraph(out: &mut String, paragraph: &Paragraph) {
    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                match run_child {
                    RunChild::Text(t) => out.push_str(&t.text),
                    RunChild::Tab(_) => out.push('\t'),
                    RunChild::Break(_) => out.push('\n'),
                    _ => {}
                }
            }
        }
    }
    out.push('\n');
}

#[allow(irrefutable_let_patterns)]
fn push_table(out: &mut String, table: &Table) {
    for row in &table.rows {
        let TableChild::TableRow(row) = row else {
            continue;
        };
        for cell in &row.cells {
            let TableRowChild::TableCell(cell) = cell else {
                continue;
            };
            for content in &cell.children {
                match content {
                    TableCellContent::Paragraph(p) => push_paragraph(out, p),
                    TableCellContent::Table(t) => push_table(out, t),
                    _ => {}
                }
            }
        }
    }
}
