use ai_doctor::diagnose::parse::{parse_fix_list, BalancedScan, NaiveBracketScan};
use ai_doctor::patch::{self, Fix};
use ai_doctor::SourceDocument;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn synthetic_source(line_count: usize) -> String {
    let mut out = String::from("public class Big {\n");
    for i in 0..line_count {
        if i % 10 == 0 {
            out.push_str(&format!("  void m{}() {{\n", i));
        } else if i % 10 == 9 {
            out.push_str("  }\n");
        } else {
            out.push_str(&format!("    int v{} = {};\n", i, i));
        }
    }
    out.push_str("}\n");
    out
}

fn synthetic_response(fix_count: usize, line_count: usize) -> String {
    let entries: Vec<String> = (0..fix_count)
        .map(|i| {
            format!(
                r#"{{"explanation": "fix {i}", "lineNumber": {}, "fixedCode": "    int v{i} = {i} + 1;"}}"#,
                (i * 7) % line_count + 1
            )
        })
        .collect();
    format!(
        "Here is what I found in your code:\n```json\n[{}]\n```\nLet me know if you need more.",
        entries.join(",\n")
    )
}

fn bench_extract_and_decode(c: &mut Criterion) {
    let raw = synthetic_response(200, 5_000);
    c.bench_function("parse_fix_list_naive_200", |b| {
        b.iter(|| parse_fix_list(black_box(&raw), &NaiveBracketScan).unwrap())
    });
    c.bench_function("parse_fix_list_balanced_200", |b| {
        b.iter(|| parse_fix_list(black_box(&raw), &BalancedScan).unwrap())
    });
}

fn bench_apply(c: &mut Criterion) {
    let text = synthetic_source(5_000);
    let base = SourceDocument::from_text(&text);
    let fixes: Vec<Fix> = (0..500)
        .map(|i| Fix::new(((i * 13) % 5_000 + 1) as i64, format!("    int v{} = 0;", i)))
        .collect();

    c.bench_function("apply_500_fixes_5000_lines", |b| {
        b.iter(|| {
            let mut doc = base.clone();
            patch::apply(&mut doc, black_box(&fixes))
        })
    });
}

criterion_group!(perf_core, bench_extract_and_decode, bench_apply);
criterion_main!(perf_core);
