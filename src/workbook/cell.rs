/// A decoded worksheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// No value stored, or a gap between stored columns.
    Empty,
    /// Every numeric cell; Excel keeps integers and dates as f64 too.
    Number(f64),
    Text(String),
    Bool(bool),
    /// Error literal such as `#DIV/0!`.
    Error(String),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Text written to a CSV field for this cell.
    pub fn to_field(&self) -> String {
        match self {
            Cell::Empty | Cell::Error(_) => String::new(),
            Cell::Number(n) => format_number(*n),
            Cell::Text(s) => s.clone(),
            Cell::Bool(true) => "True".into(),
            Cell::Bool(false) => "False".into(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Bool(b)
    }
}

pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        // -0.0 prints as "-0" otherwise
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
