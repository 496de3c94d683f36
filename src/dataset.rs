use std::collections::{HashMap, HashSet};

use crate::workbook::{Cell, Row};

/// A worksheet loaded into memory: the first stored row as column names,
/// every following row padded to the same width. Trailing empty cells and
/// trailing empty rows are dropped, so formatted-but-blank ranges add nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Dataset {
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = Row>,
    {
        let mut rows = rows.into_iter().map(|r| trim_trailing_empty(r.cells));

        let Some(header) = rows.next() else {
            return Dataset::default();
        };
        let mut data: Vec<Vec<Cell>> = rows.collect();
        while data.last().is_some_and(Vec::is_empty) {
            data.pop();
        }

        let width = data
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(header.len()))
            .max()
            .unwrap_or(0);

        let headers = dedupe_headers(
            (0..width)
                .map(|i| match header.get(i).map(Cell::to_field) {
                    Some(name) if !name.is_empty() => name,
                    _ => format!("Unnamed: {i}"),
                })
                .collect(),
        );

        for row in &mut data {
            row.resize(width, Cell::Empty);
        }

        Dataset {
            headers,
            rows: data,
        }
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

fn trim_trailing_empty(mut cells: Vec<Cell>) -> Vec<Cell> {
    while cells.last().is_some_and(Cell::is_empty) {
        cells.pop();
    }
    cells
}

/// Repeated names get `.1`, `.2`, ... suffixes, skipping any suffixed name
/// that is already taken.
fn dedupe_headers(names: Vec<String>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::with_capacity(names.len());
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(names.len());

    for name in names {
        let mut unique = name.clone();
        if taken.contains(&unique) {
            let n = counts.entry(name.clone()).or_insert(0);
            loop {
                *n += 1;
                unique = format!("{name}.{n}");
                if !taken.contains(&unique) {
                    break;
                }
            }
        }
        taken.insert(unique.clone());
        out.push(unique);
    }
    out
}
