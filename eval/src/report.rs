//! Report serializers over [`ExperimentReport`]: Markdown, LaTeX, JSON
//! and HTML. All of them are infallible.

use serde_json::{json, Map, Value};

use crate::experiment::{ExperimentReport, MethodResult, StatisticalTestResult};
use crate::metrics::Metric;

/// Column label: `PRECISION@K` / `RECALL@K`, title case otherwise.
pub fn metric_label(metric: &Metric) -> String {
    match metric {
        Metric::PrecisionAt(k) => format!("PRECISION@{}", k),
        Metric::RecallAt(k) => format!("RECALL@{}", k),
        other => title_case(&other.id()),
    }
}

fn title_case(id: &str) -> String {
    id.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn metric_value(method: &MethodResult, metric: &Metric) -> Option<f64> {
    method.results.get(&metric.id()).copied()
}

fn fmt_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.4}", v),
        None => "-".to_string(),
    }
}

fn fmt_statistic(test: &StatisticalTestResult) -> String {
    fmt_value(test.statistic)
}

fn is_winner(report: &ExperimentReport, method: &MethodResult) -> bool {
    report.winner.as_deref() == Some(method.name.as_str())
}

/// Table-safe text: `|` is escaped and line breaks become spaces.
fn markdown_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\r', '\n'], " ")
}

pub fn generate_markdown_report(report: &ExperimentReport) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Experiment Report: {}\n\n", report.name));
    md.push_str(&format!("**Graph:** {}\n\n", report.graph_spec));
    md.push_str(&format!(
        "**Generated:** {}\n\n",
        report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if let Some(ms) = report.duration_ms {
        md.push_str(&format!("**Duration:** {} ms\n\n", ms));
    }

    md.push_str("## Winner\n\n");
    match report.winner.as_deref().and_then(|w| report.method(w)) {
        Some(winner) => md.push_str(&format!(
            "**{}** (mean score {:.4} across {} metrics)\n\n",
            markdown_cell(&winner.name),
            winner.aggregate_score(),
            report.metrics.len()
        )),
        None if report.metrics.is_empty() => md.push_str("No winner: no metrics were computed.\n\n"),
        None => match report.winner.as_deref() {
            Some(name) => md.push_str(&format!(
                "Winner `{}` has no results in this report.\n\n",
                markdown_cell(name)
            )),
            None => md.push_str("No winner was determined.\n\n"),
        },
    }

    md.push_str("## Results\n\n");
    write_markdown_results(&mut md, report);

    md.push_str("## Statistical Tests\n\n");
    write_markdown_tests(&mut md, report);

    md
}

fn write_markdown_results(md: &mut String, report: &ExperimentReport) {
    md.push_str("| Method |");
    for metric in &report.metrics {
        md.push_str(&format!(" {} |", metric_label(metric)));
    }
    md.push_str(" Runtime (ms) |\n");

    md.push_str("|--------|");
    for _ in &report.metrics {
        md.push_str("--------|");
    }
    md.push_str("--------------|\n");

    for method in &report.methods {
        let name = if is_winner(report, method) {
            format!("**{}**", markdown_cell(&method.name))
        } else {
            markdown_cell(&method.name)
        };
        md.push_str(&format!("| {} |", name));
        for metric in &report.metrics {
            md.push_str(&format!(" {} |", fmt_value(metric_value(method, metric))));
        }
        md.push_str(&format!(" {:.2} |\n", method.runtime_ms));
    }
    md.push('\n');
}

fn write_markdown_tests(md: &mut String, report: &ExperimentReport) {
    if report.statistical_tests.is_empty() {
        md.push_str("No statistical tests were run.\n");
        return;
    }

    md.push_str(&format!(
        "Correction: `{}`\n\n",
        serde_json::to_value(report.correction)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default()
    ));
    md.push_str("| Test | Methods | Statistic | p-value | Adjusted p | Significant |\n");
    md.push_str("|------|---------|-----------|---------|------------|-------------|\n");
    for test in &report.statistical_tests {
        md.push_str(&format!(
            "| {} | {} | {} | {:.4} | {:.4} | {} |\n",
            test.test_type.as_str(),
            markdown_cell(&test.compared_methods.join(" vs ")),
            fmt_statistic(test),
            test.p_value,
            test.adjusted_p_value,
            if test.significant { "yes" } else { "no" }
        ));
    }
}

fn latex_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            _ => out.push(c),
        }
    }
    out
}

/// LaTeX `table` with one row per method; the winner is set in bold.
pub fn generate_latex_table(report: &ExperimentReport) -> String {
    let mut tex = String::new();
    tex.push_str("\\begin{table}[ht]\n");
    tex.push_str("\\centering\n");
    tex.push_str(&format!("\\caption{{{}}}\n", latex_escape(&report.name)));
    tex.push_str(&format!("\\begin{{tabular}}{{l{}}}\n", "c".repeat(report.metrics.len())));
    tex.push_str("\\hline\n");

    tex.push_str("Method");
    for metric in &report.metrics {
        tex.push_str(&format!(" & {}", latex_escape(&metric_label(metric))));
    }
    tex.push_str(" \\\\\n\\hline\n");

    for method in &report.methods {
        let winner = is_winner(report, method);
        let cell = |s: String| if winner { format!("\\textbf{{{}}}", s) } else { s };
        tex.push_str(&cell(latex_escape(&method.name)));
        for metric in &report.metrics {
            tex.push_str(&format!(" & {}", cell(fmt_value(metric_value(method, metric)))));
        }
        tex.push_str(" \\\\\n");
    }

    tex.push_str("\\hline\n");
    tex.push_str("\\end{tabular}\n");
    tex.push_str("\\end{table}\n");
    tex
}

/// Pretty-printed JSON summary with camelCase keys.
pub fn generate_json_summary(report: &ExperimentReport) -> String {
    let methods: Vec<Value> = report
        .methods
        .iter()
        .map(|m| {
            json!({
                "name": m.name,
                "results": m.results,
                "aggregateScore": m.aggregate_score(),
                "runtimeMs": m.runtime_ms,
            })
        })
        .collect();

    let tests: Vec<Value> = report
        .statistical_tests
        .iter()
        .map(|t| {
            json!({
                "type": t.test_type.as_str(),
                "comparedMethods": t.compared_methods,
                "statistic": t.statistic,
                "pValue": t.p_value,
                "adjustedPValue": t.adjusted_p_value,
                "significant": t.significant,
            })
        })
        .collect();

    let mut summary = Map::new();
    summary.insert("name".into(), json!(report.name));
    summary.insert("graphSpec".into(), json!(report.graph_spec));
    summary.insert("timestamp".into(), json!(report.timestamp.to_rfc3339()));
    if let Some(ms) = report.duration_ms {
        summary.insert("durationMs".into(), json!(ms));
    }
    summary.insert(
        "metrics".into(),
        json!(report.metrics.iter().map(Metric::id).collect::<Vec<_>>()),
    );
    summary.insert("winner".into(), json!(report.winner));
    summary.insert("correction".into(), json!(report.correction));
    summary.insert("methods".into(), Value::Array(methods));
    summary.insert("statisticalTests".into(), Value::Array(tests));

    format!("{:#}", Value::Object(summary))
}

fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const HTML_STYLE: &str = "body { font-family: sans-serif; margin: 2em; }
table { border-collapse: collapse; margin-bottom: 1.5em; }
th, td { border: 1px solid #ccc; padding: 4px 10px; text-align: right; }
th:first-child, td:first-child { text-align: left; }
tr.winner { background: #e6f4ea; font-weight: bold; }
tr.significant td.verdict { color: #137333; font-weight: bold; }
tr.not-significant td.verdict { color: #888; }
";

/// Standalone HTML page. Every interpolated string is escaped.
pub fn generate_html_report(report: &ExperimentReport) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", html_escape(&report.name)));
    html.push_str(&format!("<style>\n{}</style>\n</head>\n<body>\n", HTML_STYLE));

    html.push_str(&format!("<h1>Experiment Report: {}</h1>\n", html_escape(&report.name)));
    html.push_str(&format!(
        "<p>Graph: {}<br>Generated: {}",
        html_escape(&report.graph_spec),
        report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if let Some(ms) = report.duration_ms {
        html.push_str(&format!("<br>Duration: {} ms", ms));
    }
    html.push_str("</p>\n");

    match &report.winner {
        Some(w) => html.push_str(&format!(
            "<p class=\"winner\">Winner: <strong>{}</strong></p>\n",
            html_escape(w)
        )),
        None => html.push_str("<p>No winner: no metrics were computed.</p>\n"),
    }

    html.push_str("<h2>Results</h2>\n<table>\n<tr><th>Method</th>");
    for metric in &report.metrics {
        html.push_str(&format!("<th>{}</th>", html_escape(&metric_label(metric))));
    }
    html.push_str("<th>Runtime (ms)</th></tr>\n");
    for method in &report.methods {
        let class = if is_winner(report, method) { " class=\"winner\"" } else { "" };
        html.push_str(&format!("<tr{}><td>{}</td>", class, html_escape(&method.name)));
        for metric in &report.metrics {
            html.push_str(&format!("<td>{}</td>", fmt_value(metric_value(method, metric))));
        }
        html.push_str(&format!("<td>{:.2}</td></tr>\n", method.runtime_ms));
    }
    html.push_str("</table>\n");

    html.push_str("<h2>Statistical Tests</h2>\n");
    if report.statistical_tests.is_empty() {
        html.push_str("<p>No statistical tests were run.</p>\n");
    } else {
        html.push_str(
            "<table>\n<tr><th>Test</th><th>Methods</th><th>Statistic</th><th>p-value</th>\
             <th>Adjusted p</th><th>Significant</th></tr>\n",
        );
        for test in &report.statistical_tests {
            let (class, verdict) = if test.significant {
                ("significant", "yes")
            } else {
                ("not-significant", "no")
            };
            let methods: Vec<String> = test.compared_methods.iter().map(|m| html_escape(m)).collect();
            html.push_str(&format!(
                "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{:.4}</td><td>{:.4}</td>\
                 <td class=\"verdict\">{}</td></tr>\n",
                class,
                test.test_type.as_str(),
                methods.join(" vs "),
                fmt_statistic(test),
                test.p_value,
                test.adjusted_p_value,
                verdict
            ));
        }
        html.push_str("</table>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}
