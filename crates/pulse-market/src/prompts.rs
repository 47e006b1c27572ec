//! Prompt templates for analysis narratives

use minijinja::{Environment, Value};
use serde::Serialize;

use crate::error::{Result, StockError};

/// System prompt of every analysis narrative
pub const ANALYST_SYSTEM: &str = "You are a professional Indian stock market analyst with expertise in technical and fundamental analysis.";

/// User prompt of an analysis narrative
///
/// Variables: `symbol`, `stock_data` and `technical_data` (pre-rendered JSON)
/// and `headlines` (a list of `{title, snippet}`).
pub const ANALYSIS_TEMPLATE: &str = r"Analyze the following data for {{ symbol }}:

Stock Data: {{ stock_data }}
Technical Indicators: {{ technical_data }}
Recent News:
{%- for item in headlines %}
- {{ item.title }}: {{ item.snippet }}
{%- else %}
- No recent news available
{%- endfor %}

Please provide a comprehensive analysis including:
1. Current market position and valuation
2. Technical analysis interpretation (if data available)
3. News sentiment analysis
4. Trading recommendation (Short-term and Long-term)
5. Key risks and opportunities
6. If I buy at the current price, what should be the target price and stop loss? Explain your reasoning.

Note: If some data is missing or shows errors, focus on the available data and mention the limitations in your analysis.";

/// Render a template string with serializable variables
pub fn render<V: Serialize>(name: &str, template: &str, vars: &V) -> Result<String> {
    let env = Environment::new();
    env.render_str(template, Value::from_serialize(vars))
        .map_err(|e| StockError::ConfigError(format!("prompt template {name}: {e}")))
}
