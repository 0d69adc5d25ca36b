//! TruthTable - analysis result held on the Rust side of the Python boundary
//!
//! Python keeps a handle to the table and pulls headings and rows on demand
//! instead of receiving the whole structure as one converted object.

use pyo3::prelude::*;
use pyo3::types::{PyAny, PyDict, PyList};

use super::{Analysis, HeadingKind};

// ============================================================================
// TruthTable PyClass
// ============================================================================

/// Truth table of one analyzed expression
#[pyclass]
pub struct TruthTable {
    analysis: Analysis,
}

impl TruthTable {
    pub fn new(analysis: Analysis) -> Self {
        Self { analysis }
    }

    pub fn analysis(&self) -> &Analysis {
        &self.analysis
    }

    fn rows(&self, outcome: bool) -> &[Vec<Option<bool>>] {
        if outcome {
            &self.analysis.true_rows
        } else {
            &self.analysis.false_rows
        }
    }
}

#[pymethods]
impl TruthTable {
    // ------------------------------------------------------------------------
    // Getter Properties
    // ------------------------------------------------------------------------

    /// Submission text after normalization
    #[getter]
    fn normalized(&self) -> &str {
        &self.analysis.normalized
    }

    /// Canonical expression text, e.g. "a OR (b AND c)"
    #[getter]
    fn expression(&self) -> &str {
        &self.analysis.expression
    }

    #[getter]
    fn leaf_count(&self) -> usize {
        self.analysis.leaf_count
    }

    /// Total number of rows, true and false
    #[getter]
    fn row_count(&self) -> usize {
        self.analysis.row_count()
    }

    /// Headings as dicts with `text`, `kind` ("condition" or "operator") and
    /// `depth`
    #[getter]
    fn headings(&self, py: Python<'_>) -> PyResult<Py<PyAny>> {
        let list = PyList::empty(py);
        for heading in &self.analysis.headings {
            let dict = PyDict::new(py);
            dict.set_item("text", &heading.text)?;
            dict.set_item(
                "kind",
                match heading.kind {
                    HeadingKind::Condition => "condition",
                    HeadingKind::Operator => "operator",
                },
            )?;
            dict.set_item("depth", heading.depth)?;
            list.append(dict)?;
        }
        Ok(list.into())
    }

    /// Rows making the expression true; `None` marks don't-care
    #[getter]
    fn true_rows(&self) -> Vec<Vec<Option<bool>>> {
        self.analysis.true_rows.clone()
    }

    /// Rows making the expression false; `None` marks don't-care
    #[getter]
    fn false_rows(&self) -> Vec<Vec<Option<bool>>> {
        self.analysis.false_rows.clone()
    }

    // ------------------------------------------------------------------------
    // Lazy Data Access Methods
    // ------------------------------------------------------------------------

    /// A single row as a `{condition text: value}` dict, or None when out of
    /// bounds
    fn get_row(&self, py: Python<'_>, outcome: bool, index: usize) -> PyResult<Py<PyAny>> {
        match self.rows(outcome).get(index) {
            Some(row) => {
                let dict = PyDict::new(py);
                for (text, value) in self.analysis.leaf_texts().into_iter().zip(row) {
                    dict.set_item(text, *value)?;
                }
                Ok(dict.into())
            }
            None => Ok(py.None()),
        }
    }

    /// The whole analysis as a JSON string
    fn to_json(&self) -> PyResult<String> {
        Ok(self.analysis.to_json()?)
    }

    fn __repr__(&self) -> String {
        format!(
            "TruthTable(expression={:?}, true_rows={}, false_rows={})",
            self.analysis.expression,
            self.analysis.true_rows.len(),
            self.analysis.false_rows.len()
        )
    }

    fn __len__(&self) -> usize {
        self.analysis.row_count()
    }
}

impl From<Analysis> for TruthTable {
    fn from(analysis: Analysis) -> Self {
        Self::new(analysis)
    }
}
