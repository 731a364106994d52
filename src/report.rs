use std::io::{self, Write};

use crate::{device::Device, PerfEvent};

/// A value that can be rendered as a report column.
///
/// Floats are rendered with two decimals, integers and strings verbatim.
pub trait Cell {
    /// Render the column value.
    fn to_cell(&self) -> String;
}

impl Cell for f64 {
    fn to_cell(&self) -> String {
        format!("{:.2}", self)
    }
}

macro_rules! integer_cell {
    ($($t:ty),*) => {
        $(impl Cell for $t {
            fn to_cell(&self) -> String {
                self.to_string()
            }
        })*
    };
}

integer_cell!(u32, u64, u128, usize, i32, i64);

impl Cell for str {
    fn to_cell(&self) -> String {
        self.to_string()
    }
}

impl Cell for String {
    fn to_cell(&self) -> String {
        self.clone()
    }
}

/// A two line, comma separated table: a header line of column names and a
/// data line of values, each column right-aligned to the wider of the two.
///
/// ```
/// use perf_block::Report;
///
/// let mut r = Report::default();
/// r.push("cycle", &1234.5);
/// r.push_last("IPC", &2.0);
///
/// assert_eq!(r.header(), "  cycle,  IPC ");
/// assert_eq!(r.data(), "1234.50, 2.00 ");
/// ```
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Report {
    header: String,
    data: String,
}

impl Report {
    /// Append a column followed by a comma.
    pub fn push<T: Cell + ?Sized>(&mut self, name: &str, value: &T) {
        self.column(name, &value.to_cell(), ",")
    }

    /// Append the final column, without a trailing comma.
    pub fn push_last<T: Cell + ?Sized>(&mut self, name: &str, value: &T) {
        self.column(name, &value.to_cell(), "")
    }

    fn column(&mut self, name: &str, value: &str, sep: &str) {
        let width = name.len().max(value.len());
        self.header
            .push_str(&format!("{:>width$}{} ", name, sep, width = width));
        self.data
            .push_str(&format!("{:>width$}{} ", value, sep, width = width));
    }

    /// The column names line, without a newline.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// The values line, without a newline.
    pub fn data(&self) -> &str {
        &self.data
    }

    /// `true` until a column is pushed.
    pub fn is_empty(&self) -> bool {
        self.header.is_empty()
    }

    /// Write the header line followed by the data line.
    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", self.header)?;
        writeln!(out, "{}", self.data)
    }
}

impl<D: Device> PerfEvent<D> {
    /// Label subsequent reports with `name = value`.
    ///
    /// Setting an existing name replaces its value. Parameters are reported in
    /// name order.
    pub fn set_param(&mut self, name: impl Into<String>, value: impl ToString) {
        self.params.insert(name.into(), value.to_string());
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Append a column for every parameter.
    pub fn report_params(&self, report: &mut Report) {
        for (name, value) in self.params() {
            report.push(name, value);
        }
    }

    /// Append every counter divided by `scale`, the `scale` itself, and the
    /// derived `IPC`, `CPU` and `GHz` metrics.
    ///
    /// Nothing is appended when no counters are open.
    pub fn report_into(&self, report: &mut Report, scale: u64) {
        if self.is_empty() {
            return;
        }

        for (name, value) in self.values() {
            report.push(name, &(value / scale as f64));
        }
        report.push("scale", &scale);

        report.push("IPC", &self.ipc());
        report.push("CPU", &self.cpus());
        report.push_last("GHz", &self.ghz());
    }

    /// The counter report for the last window, normalised by `scale`.
    pub fn report(&self, scale: u64) -> Report {
        let mut report = Report::default();
        self.report_into(&mut report, scale);
        report
    }

    /// Write the counter report to `out`; writes nothing when no counters are
    /// open.
    pub fn write_report<W: Write + ?Sized>(&self, out: &mut W, scale: u64) -> io::Result<()> {
        let report = self.report(scale);
        if report.is_empty() {
            return Ok(());
        }
        report.write_to(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{device::Target, UnsupportedDevice};

    #[test]
    fn test_column_width() {
        let mut r = Report::default();
        r.push("time_us", &5u64);
        r.push("x", "long value");
        r.push_last("GHz", &3.0);

        assert_eq!(r.header(), "time_us,          x,  GHz ");
        assert_eq!(r.data(), "      5, long value, 3.00 ");
    }

    #[test]
    fn test_write_to() {
        let mut r = Report::default();
        r.push_last("a", &1u32);

        let mut out = Vec::new();
        r.write_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a \n1 \n");
    }

    #[test]
    fn test_params_sorted_and_replaced() {
        let mut perf = PerfEvent::empty(UnsupportedDevice, Target::default());
        perf.set_param("threads", 4);
        perf.set_param("name", "btree");
        perf.set_param("threads", 8);

        assert_eq!(
            perf.params().collect::<Vec<_>>(),
            [("name", "btree"), ("threads", "8")]
        );

        let mut r = Report::default();
        perf.report_params(&mut r);
        assert_eq!(r.header(), " name, threads, ");
        assert_eq!(r.data(), "btree,       8, ");
    }

    #[test]
    fn test_empty_report() {
        let perf = PerfEvent::empty(UnsupportedDevice, Target::default());
        assert!(perf.report(1).is_empty());

        let mut out = Vec::new();
        perf.write_report(&mut out, 1).unwrap();
        assert!(out.is_empty());
    }
}
