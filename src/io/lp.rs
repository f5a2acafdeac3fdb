use super::format::*;
use crate::solver::utils::infbounds::*;
use crate::solver::{ColumnType, ObjectiveSense, Problem};
use itertools::Itertools;
use std::io::Write;

// CPLEX LP lines are limited in length, so long expressions wrap
const TERMS_PER_LINE: usize = 8;

/// CPLEX LP text format.   Write only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LpFormat;

impl ProblemFileFormat for LpFormat {
    fn name(&self) -> &'static str {
        "LP"
    }

    fn write(
        &self,
        problem: &Problem,
        name: &str,
        out: &mut dyn Write,
    ) -> Result<(), ProblemFileError> {
        writeln!(out, "\\Problem name: {}", name)?;
        writeln!(out)?;

        match problem.sense {
            ObjectiveSense::Minimize => writeln!(out, "Minimize")?,
            ObjectiveSense::Maximize => writeln!(out, "Maximize")?,
        }
        let mut objective = linear_terms(problem.objective.iter().copied().enumerate());
        if let Some(Q) = &problem.quadratic {
            let quad = quadratic_terms(Q.triplets());
            if !quad.is_empty() {
                objective.push("+ [".to_string());
                objective.extend(quad);
                objective.push("] / 2".to_string());
            }
        }
        write_expression(out, " obj:", &objective)?;

        writeln!(out, "Subject To")?;
        let At = problem.matrix.transpose();
        let data = problem.linear_data();
        for i in 0..problem.nrows {
            let mut terms = linear_terms(At.column(i));
            if terms.is_empty() && problem.ncols > 0 {
                terms.push(format!("0 {}", column_name(0)));
            }
            let (lo, hi) = data.row_bounds(i);
            let label = format!(" {}:", row_name(i));
            match (lo, hi) {
                (Some(lo), Some(hi)) if lo == hi => {
                    terms.push(format!("= {}", fmt_num(hi)));
                    write_expression(out, &label, &terms)?;
                }
                (Some(lo), Some(hi)) => {
                    let label = format!("{} {} <=", label, fmt_num(lo));
                    terms.push(format!("<= {}", fmt_num(hi)));
                    write_expression(out, &label, &terms)?;
                }
                (None, Some(hi)) => {
                    terms.push(format!("<= {}", fmt_num(hi)));
                    write_expression(out, &label, &terms)?;
                }
                (Some(lo), None) => {
                    terms.push(format!(">= {}", fmt_num(lo)));
                    write_expression(out, &label, &terms)?;
                }
                // infinite on both sides
                (None, None) => {
                    terms.push(">= -infinity".to_string());
                    write_expression(out, &label, &terms)?;
                }
            }
        }

        writeln!(out, "Bounds")?;
        let types = problem.effective_column_types();
        for j in 0..problem.ncols {
            if types.as_ref().map_or(false, |t| t[j] == ColumnType::B) {
                continue;
            }
            if let Some(line) = bound_line(&column_name(j), problem.lower[j], problem.upper[j]) {
                writeln!(out, " {}", line)?;
            }
        }

        if let Some(types) = &types {
            write_section(out, "General", types, |t| {
                matches!(t, ColumnType::I | ColumnType::N)
            })?;
            write_section(out, "Binary", types, |t| *t == ColumnType::B)?;
            write_section(out, "Semi-continuous", types, |t| t.is_semicontinuous())?;
        }

        writeln!(out, "End")?;
        Ok(())
    }
}

fn signed(v: f64, first: bool) -> String {
    match (v < 0.0, first) {
        (true, _) => format!("- {}", fmt_num(-v)),
        (false, true) => fmt_num(v),
        (false, false) => format!("+ {}", fmt_num(v)),
    }
}

fn linear_terms(coefs: impl Iterator<Item = (usize, f64)>) -> Vec<String> {
    coefs
        .filter(|&(_, v)| v != 0.0)
        .enumerate()
        .map(|(k, (j, v))| format!("{} {}", signed(v, k == 0), column_name(j)))
        .collect()
}

// terms of x'Qx for a full symmetric Q, one per upper triangular entry
fn quadratic_terms(entries: impl Iterator<Item = (usize, usize, f64)>) -> Vec<String> {
    entries
        .filter(|&(r, c, v)| r <= c && v != 0.0)
        .sorted_by_key(|&(r, c, _)| (r, c))
        .enumerate()
        .map(|(k, (r, c, v))| {
            if r == c {
                format!("{} {} ^ 2", signed(v, k == 0), column_name(r))
            } else {
                format!(
                    "{} {} * {}",
                    signed(2.0 * v, k == 0),
                    column_name(r),
                    column_name(c)
                )
            }
        })
        .collect()
}

fn write_expression(out: &mut dyn Write, label: &str, terms: &[String]) -> std::io::Result<()> {
    if terms.is_empty() {
        return writeln!(out, "{}", label);
    }
    let chunks = terms.iter().chunks(TERMS_PER_LINE);
    for (k, chunk) in (&chunks).into_iter().enumerate() {
        let lead = if k == 0 { label } else { "   " };
        writeln!(out, "{} {}", lead, chunk.format(" "))?;
    }
    Ok(())
}

fn write_section(
    out: &mut dyn Write,
    title: &str,
    types: &[ColumnType],
    select: impl Fn(&ColumnType) -> bool,
) -> std::io::Result<()> {
    let cols: Vec<String> = (0..types.len())
        .filter(|&j| select(&types[j]))
        .map(column_name)
        .collect();
    if cols.is_empty() {
        return Ok(());
    }
    writeln!(out, "{}", title)?;
    for chunk in &cols.iter().chunks(TERMS_PER_LINE) {
        writeln!(out, " {}", chunk.format(" "))?;
    }
    Ok(())
}

// LP default bounds are [0, +inf), which need no line
fn bound_line(col: &str, lower: f64, upper: f64) -> Option<String> {
    let lo_inf = is_neg_infinite(lower);
    let hi_inf = is_pos_infinite(upper);
    match (lo_inf, hi_inf) {
        (true, true) => Some(format!("{} free", col)),
        (true, false) => Some(format!("-infinity <= {} <= {}", col, fmt_num(upper))),
        (false, true) if lower == 0.0 => None,
        (false, true) => Some(format!("{} >= {}", col, fmt_num(lower))),
        (false, false) if lower == upper => Some(format!("{} = {}", col, fmt_num(upper))),
        (false, false) => Some(format!(
            "{} <= {} <= {}",
            fmt_num(lower),
            col,
            fmt_num(upper)
        )),
    }
}

// ---------------------------------------------------------
// tests
// ---------------------------------------------------------
