use anyhow::Result;
#[cfg(feature = "colorized_output")]
use console::style;
use std::path::PathBuf;

use scopetrace::alb::AlbOptions;
use scopetrace::export::TraceSetSummary;

use super::input::Capture;

fn heading(text: &str) -> String {
    #[cfg(feature = "colorized_output")]
    {
        style(text).bold().cyan().to_string()
    }
    #[cfg(not(feature = "colorized_output"))]
    {
        text.to_string()
    }
}

fn warning(text: &str) -> String {
    #[cfg(feature = "colorized_output")]
    {
        style(text).yellow().to_string()
    }
    #[cfg(not(feature = "colorized_output"))]
    {
        text.to_string()
    }
}

fn number(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.6e}", v))
        .unwrap_or_else(|| "-".to_string())
}

/// Display header fields and per-trace statistics of a capture
pub fn run(file: PathBuf) -> Result<()> {
    let capture = Capture::load(&file, AlbOptions::default())?;

    println!("{}", heading("Capture Information"));
    println!("{}", heading("==================="));
    println!("File: {}", file.display());
    println!();

    match &capture {
        Capture::Isf(group) => {
            println!("Format: Tektronix ISF ({} channel file(s))", group.headers.len());
            for (name, header) in &group.headers {
                println!();
                println!("{}", heading(&format!("Channel {}", name)));
                if let Some(id) = &header.waveform_id {
                    println!("  WFID: {}", id.channel);
                    if let Some(coupling) = &id.coupling {
                        println!("  Coupling: {}", coupling);
                    }
                }
                println!(
                    "  Bit width: {}",
                    header
                        .bit_width
                        .map(|w| w.to_string())
                        .unwrap_or_else(|| "-".to_string())
                );
                println!("  Byte order: {:?}", header.byte_order);
                println!("  XINCR: {}", number(header.x_increment));
                println!("  YMULT: {}", number(header.y_multiplier));
                println!("  YOFF:  {}", number(header.y_offset));
                for (key, value) in &header.fields {
                    println!("    {:8} {}", key, value);
                }
            }
            for failure in &group.missing {
                println!("{}", warning(&format!("Missing: {}", failure)));
            }
        }
        Capture::Alb(alb) => {
            println!("Format: Agilent ALB ({} table(s))", alb.tables.len());
            for table in &alb.tables {
                println!();
                println!("{}", heading(&format!("Table {}", table.name)));
                println!(
                    "  Value width: {:?} byte(s), {:?} bit(s)",
                    table.value_bytes, table.width_bits
                );
                for (key, value) in &table.fields {
                    println!("    {:10} {:?}", key, value);
                }
                match &table.setup {
                    Some(setup) => println!("  Setup: {:?}", setup),
                    None => println!("{}", warning("  Setup: none")),
                }
            }
            for name in &alb.unmatched_setup {
                println!("{}", warning(&format!("Setup entry without table: {}", name)));
            }
        }
    }

    let summary = TraceSetSummary::from_traces(capture.traces());
    println!();
    println!("{}", heading("Traces"));
    println!("  Samples: {}", summary.samples);
    println!("  Sample interval: {} s", number(summary.sample_interval));
    println!("  Duration: {} s", number(Some(summary.duration)));
    for (name, trace) in &summary.traces {
        println!(
            "  {:8} min {}  max {}  mean {}  V*s/s {}",
            name,
            number(trace.min),
            number(trace.max),
            number(trace.mean),
            number(trace.voltsec_total)
        );
    }

    Ok(())
}
