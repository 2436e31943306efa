use {
    crate::record::LimitRecord,
    log::warn,
    std::{
        fs::File,
        io::{self, BufWriter, Stdout, Write},
        path::Path,
    },
};

pub fn region_header(region: &str) -> String {
    format!("############# region {region} #############")
}

/// Counts gathered while writing a report.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ReportSummary {
    pub regions: usize,
    pub records: usize,
    pub exhausted: usize,
}

/// Writes region sections to the primary sink and echoes exhausted limits to the alert stream.
pub struct Reporter<W: Write, A: Write> {
    sink: W,
    alerts: A,
    summary: ReportSummary,
}

impl<W: Write, A: Write> Reporter<W, A> {
    pub fn new(sink: W, alerts: A) -> Self {
        Self {
            sink,
            alerts,
            summary: ReportSummary::default(),
        }
    }

    /// Write the header for `region` followed by each record as a 2-space indented JSON object.
    pub fn write_region(&mut self, region: &str, records: &[LimitRecord]) -> io::Result<()> {
        writeln!(self.sink, "{}", region_header(region))?;
        self.summary.regions += 1;

        for record in records {
            let block = serde_json::to_string_pretty(record)?;
            writeln!(self.sink, "{block}")?;
            self.summary.records += 1;

            if record.is_exhausted() {
                warn!("Limit {} of {} in {} is exhausted", record.limit_name, record.service_name, region);
                writeln!(self.alerts, "{block}")?;
                self.summary.exhausted += 1;
            }
        }

        Ok(())
    }

    pub fn finish(mut self) -> io::Result<ReportSummary> {
        self.sink.flush()?;
        self.alerts.flush()?;
        Ok(self.summary)
    }
}

/// Where the report goes: standard output, or a file created (truncated) when the run starts.
pub enum OutputSink {
    Stdout(Stdout),
    File(BufWriter<File>),
}

impl OutputSink {
    pub fn open(path: Option<&Path>) -> io::Result<Self> {
        match path {
            None => Ok(Self::Stdout(io::stdout())),
            Some(path) => Ok(Self::File(BufWriter::new(File::create(path)?))),
        }
    }
}

impl Write for OutputSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(out) => out.write(buf),
            Self::File(file) => file.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(out) => out.flush(),
            Self::File(file) => file.flush(),
        }
    }
}
