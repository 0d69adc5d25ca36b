//! Conditional Parser Core - boolean expression analysis engine
//!
//! Parses free-form conditional source text such as `if (a || (b && c)) {`
//! into a tree of conditions joined by AND/OR/XOR, computes the evaluation
//! paths that make every level true or false (with a don't-care state) and
//! expands them into a leaf-level truth table.
//!
//! Python bindings via PyO3 are available with the `python` feature.

pub mod analysis;
pub mod config;
pub mod error;
pub mod expression;

pub use analysis::{Analysis, Analyzer, Heading, HeadingKind};
pub use config::{Limits, ParserConfig};
pub use error::{AnalysisError, Result};
pub use expression::{
    expand, generate_paths, normalize, parse, Condition, Entry, EvalPath, Expression, Operator,
    Parser, TriState,
};

#[cfg(feature = "python")]
mod bindings {
    use crate::analysis::{Analyzer, TruthTable};
    use crate::config::ParserConfig;
    use crate::error::AnalysisError;
    use once_cell::sync::OnceCell;
    use parking_lot::RwLock;
    use pyo3::prelude::*;
    use pyo3::types::PyDict;
    use std::sync::Arc;

    // ============================================================================
    // Cached Configuration
    // ============================================================================

    /// Global analyzer built by `init_config`
    static CACHED_ANALYZER: OnceCell<Arc<RwLock<Analyzer>>> = OnceCell::new();

    fn cached_analyzer() -> PyResult<Arc<RwLock<Analyzer>>> {
        CACHED_ANALYZER
            .get()
            .cloned()
            .ok_or_else(|| AnalysisError::ConfigNotInitialized.into())
    }

    // ============================================================================
    // Helper Functions
    // ============================================================================

    /// Deserialize a parser configuration from a Python dict
    ///
    /// The dict goes through `json.dumps` so the same field names and defaults
    /// apply as for JSON configuration files.
    fn deserialize_config(dict: &Bound<'_, PyDict>) -> PyResult<ParserConfig> {
        let json: String = dict
            .py()
            .import("json")?
            .call_method1("dumps", (dict,))?
            .extract()?;
        Ok(ParserConfig::from_json(&json)?)
    }

    // ============================================================================
    // Python Functions
    // ============================================================================

    /// Initialize the parser configuration (call once at startup)
    ///
    /// # Arguments
    /// * `config` - Optional dict with token lists (`and`, `or`, `xor`,
    ///   `line_break`, `ignore_leading`, `ignore_trailing`) and `limits`;
    ///   missing fields keep their defaults
    ///
    /// # Raises
    /// ValueError if a token pattern does not compile
    #[pyfunction]
    #[pyo3(signature = (config=None))]
    fn init_config(config: Option<&Bound<'_, PyDict>>) -> PyResult<()> {
        let config = match config {
            Some(dict) => deserialize_config(dict)?,
            None => ParserConfig::default(),
        };
        let analyzer = Analyzer::new(&config)?;

        // If already initialized, replace the analyzer
        if let Some(existing) = CACHED_ANALYZER.get() {
            *existing.write() = analyzer;
        } else {
            let _ = CACHED_ANALYZER.set(Arc::new(RwLock::new(analyzer)));
        }

        Ok(())
    }

    /// Check if config is initialized
    #[pyfunction]
    fn is_config_initialized() -> bool {
        CACHED_ANALYZER.get().is_some()
    }

    /// Normalize a submission with the cached configuration
    ///
    /// # Raises
    /// RuntimeError if `init_config` was not called first
    #[pyfunction]
    fn normalize(text: &str) -> PyResult<String> {
        Ok(cached_analyzer()?.read().normalize(text))
    }

    /// Analyze a submission into a truth table
    ///
    /// # Raises
    /// RuntimeError if `init_config` was not called first;
    /// ValueError if the submission is rejected (too large, too deep, empty,
    /// mixing operators, or expanding to too many rows)
    #[pyfunction]
    fn analyze(py: Python<'_>, text: &str) -> PyResult<TruthTable> {
        let analyzer = cached_analyzer()?;
        let analysis = py.detach(|| analyzer.read().analyze(text))?;
        Ok(TruthTable::new(analysis))
    }

    /// Analyze a submission asynchronously
    ///
    /// Runs the analysis on a blocking tokio thread so the asyncio event loop
    /// stays responsive during large XOR expansions.
    ///
    /// # Example (Python)
    /// ```python
    /// table = await analyze_async("if (a ^ b ^ c) {")
    /// print(table.row_count)
    /// ```
    #[pyfunction]
    fn analyze_async<'py>(py: Python<'py>, text: String) -> PyResult<Bound<'py, PyAny>> {
        // Get cached analyzer before entering async context
        let analyzer = cached_analyzer()?;

        pyo3_async_runtimes::tokio::future_into_py(py, async move {
            let analysis = tokio::task::spawn_blocking(move || {
                let analyzer = analyzer.read();
                analyzer.analyze(&text)
            })
            .await
            .map_err(|e| {
                PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!(
                    "Analysis task panicked: {}",
                    e
                ))
            })??;

            Ok(TruthTable::new(analysis))
        })
    }

    // ============================================================================
    // Python Module Definition
    // ============================================================================

    #[pymodule]
    fn conditional_parser_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(init_config, m)?)?;
        m.add_function(wrap_pyfunction!(is_config_initialized, m)?)?;
        m.add_function(wrap_pyfunction!(normalize, m)?)?;
        m.add_function(wrap_pyfunction!(analyze, m)?)?;
        m.add_function(wrap_pyfunction!(analyze_async, m)?)?;
        m.add_class::<TruthTable>()?;
        Ok(())
    }
}
