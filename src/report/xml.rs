//! XML documents for the employee and manager reports.
//!
//! Rows arrive flat and ordered by department; consecutive rows sharing a
//! department code are nested under one `<department>` element.

use crate::model::{is_current, EmployeeXmlRow, ManagerXmlRow};
use chrono::NaiveDate;
use std::borrow::Cow;

const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Escapes text for use in element content and double-quoted attributes.
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Indented, append-only XML writer.
#[derive(Debug, Default)]
pub struct XmlWriter {
    buf: String,
    open: Vec<String>,
}

impl XmlWriter {
    pub fn new() -> Self {
        let mut buf = String::from(DECLARATION);
        buf.push('\n');
        Self {
            buf,
            open: Vec::new(),
        }
    }

    fn indent(&mut self) {
        for _ in 0..self.open.len() {
            self.buf.push_str("  ");
        }
    }

    fn push_start(&mut self, name: &str, attrs: &[(&str, &str)]) {
        self.indent();
        self.buf.push('<');
        self.buf.push_str(name);
        for (key, value) in attrs {
            self.buf.push(' ');
            self.buf.push_str(key);
            self.buf.push_str("=\"");
            self.buf.push_str(&escape(value));
            self.buf.push('"');
        }
    }

    /// Opens an element that will contain children.
    pub fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> &mut Self {
        self.push_start(name, attrs);
        self.buf.push_str(">\n");
        self.open.push(name.to_string());
        self
    }

    /// Writes a leaf element; `None` writes an empty element.
    pub fn leaf(&mut self, name: &str, text: Option<&str>) -> &mut Self {
        self.push_start(name, &[]);
        match text {
            Some(text) => {
                self.buf.push('>');
                self.buf.push_str(&escape(text));
                self.buf.push_str("</");
                self.buf.push_str(name);
                self.buf.push_str(">\n");
            }
            None => self.buf.push_str("/>\n"),
        }
        self
    }

    /// Closes the innermost open element.
    pub fn end(&mut self) -> &mut Self {
        if let Some(name) = self.open.pop() {
            self.indent();
            self.buf.push_str("</");
            self.buf.push_str(&name);
            self.buf.push_str(">\n");
        }
        self
    }

    /// Closes any open elements and returns the document.
    pub fn finish(mut self) -> String {
        while !self.open.is_empty() {
            self.end();
        }
        self.buf
    }
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `<departments>` document of currently assigned employees.
pub fn employees_document(rows: &[EmployeeXmlRow]) -> String {
    let mut w = XmlWriter::new();
    w.start("departments", &[]);

    let mut current_dept: Option<&str> = None;
    for row in rows {
        if current_dept != Some(row.dept_no.as_str()) {
            if current_dept.is_some() {
                w.end();
            }
            w.start(
                "department",
                &[("code", &row.dept_no), ("name", &row.dept_name)],
            );
            current_dept = Some(&row.dept_no);
        }

        let emp_no = row.emp_no.to_string();
        w.start("employee", &[("emp_no", &emp_no)])
            .leaf("first_name", Some(&row.first_name))
            .leaf("last_name", Some(&row.last_name))
            .leaf("gender", Some(&row.gender))
            .leaf("hire_date", Some(&iso(row.hire_date)))
            .leaf("title", row.title.as_deref())
            .end();
    }

    w.finish()
}

/// `<managers>` document of every manager assignment.
pub fn managers_document(rows: &[ManagerXmlRow]) -> String {
    let mut w = XmlWriter::new();
    w.start("managers", &[]);

    let mut current_dept: Option<&str> = None;
    for row in rows {
        if current_dept != Some(row.dept_no.as_str()) {
            if current_dept.is_some() {
                w.end();
            }
            w.start(
                "department",
                &[("code", &row.dept_no), ("name", &row.dept_name)],
            );
            current_dept = Some(&row.dept_no);
        }

        let emp_no = row.emp_no.to_string();
        let current = if is_current(row.to_date) { "true" } else { "false" };
        w.start("manager", &[("emp_no", &emp_no), ("current", current)])
            .leaf("first_name", Some(&row.first_name))
            .leaf("last_name", Some(&row.last_name))
            .leaf("from_date", Some(&iso(row.from_date)))
            .leaf("to_date", Some(&iso(row.to_date)))
            .end();
    }

    w.finish()
}
