use clap::{Command, Arg, ArgAction, builder::PossibleValue};
use std::error::Error;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};

use indicatif::ProgressBar;

use pdf2word_client::{collector, common, config, converter, incl_gettext_files, logging, worker};
use pdf2word_l10n as l10n;

fn main() -> Result<(), Box<dyn Error>> {
    l10n::load_translations(incl_gettext_files!("en", "zh"));
    logging::init_logging();

    let app_config: config::AppConfig = config::load_config();
    let trans = l10n::new_translations(app_config.resolve_locale());

    let help_paths = trans.gettext("PDF files or folders to convert (folders are scanned recursively)");
    let help_converter_path = trans.gettext("Optional path to the pdf2docx executable");
    let help_log_format = trans.gettext("Log format (json or plain)");

    let app = Command::new(option_env!("CARGO_PKG_NAME").unwrap_or("Unknown"))
        .version(option_env!("CARGO_PKG_VERSION").unwrap_or("Unknown"))
        .about(option_env!("CARGO_PKG_DESCRIPTION").unwrap_or("Unknown"))
        .arg(
            Arg::new("paths")
                .help(help_paths)
                .required(true)
                .action(ArgAction::Append)
                .value_parser(clap::value_parser!(PathBuf))
        ).arg(
            Arg::new("converter-path")
                .long("converter-path")
                .help(help_converter_path)
                .required(false)
        ).arg(
            Arg::new("log-format")
                .long("log-format")
                .help(help_log_format)
                .value_parser([
                    PossibleValue::new(common::LOG_FORMAT_JSON),
                    PossibleValue::new(common::LOG_FORMAT_PLAIN)
                ])
                .default_value(common::LOG_FORMAT_PLAIN)
                .required(false)
        );

    let run_matches = app.get_matches();

    let mut file_collector = collector::FileCollector::new();

    if let Some(input_paths) = run_matches.get_many::<PathBuf>("paths") {
        for input_path in input_paths {
            if !input_path.exists() {
                return Err(trans.gettext_fmt("The selected file does not exist: {0}!", vec![&input_path.display().to_string()]).into());
            }

            // UNC paths from fs::canonicalize confuse the converter on Windows
            let src_path = {
                #[cfg(not(target_os = "windows"))] {
                    std::fs::canonicalize(input_path)?
                }
                #[cfg(target_os = "windows")] {
                    dunce::canonicalize(input_path)?
                }
            };

            file_collector.add_dropped(vec![src_path]);
        }
    }

    if file_collector.is_empty() {
        return Err(trans.gettext("Please add PDF files first!").into());
    }

    let converter_exe = match run_matches.get_one::<String>("converter-path") {
        Some(cli_path) => PathBuf::from(cli_path),
        None           => converter::locate_converter(app_config.converter_path.as_deref())?,
    };

    let log_format = run_matches
        .get_one::<String>("log-format")
        .map(|v| v.as_str())
        .unwrap_or(common::LOG_FORMAT_PLAIN)
        .to_string();

    let batch_worker = worker::BatchWorker::new(
        Arc::new(converter::Pdf2DocxCommand::new(converter_exe)),
        app_config.page_range(),
        trans.clone(),
    );

    let (tx, rx) = mpsc::channel::<common::AppEvent>();
    let exec_handle = batch_worker.spawn(file_collector.snapshot(), Box::new(common::ChannelEventSender::new(tx)))?;

    if log_format == common::LOG_FORMAT_PLAIN {
        let pb = ProgressBar::new(100);

        for evt in rx {
            match evt {
                common::AppEvent::StatusChanged(msg) => pb.println(msg),
                common::AppEvent::ProgressChanged(percent) => pb.set_position(percent as u64),
                common::AppEvent::AllConversionEnded(report) => {
                    pb.set_position(100);
                    pb.finish();
                    print_summary(&report, trans.as_ref());
                },
            }
        }
    } else {
        let mut percent_complete = 0;

        for evt in rx {
            let data = match evt {
                common::AppEvent::StatusChanged(msg) => msg,
                common::AppEvent::ProgressChanged(percent) => {
                    percent_complete = percent as usize;
                    continue;
                },
                common::AppEvent::AllConversionEnded(report) => {
                    percent_complete = 100;
                    trans.gettext_fmt("Conversion ended: {0} converted, {1} failed", vec![
                        &report.converted_count().to_string(),
                        &report.failed_count().to_string(),
                    ])
                },
            };

            println!("{}", serde_json::to_string(&common::LogMessage { data, percent_complete })?);
        }
    }

    let exit_code = match exec_handle.join() {
        Ok(report) if report.failed_count() == 0 => 0,
        _ => 1,
    };

    std::process::exit(exit_code);
}

fn print_summary(report: &worker::BatchReport, trans: &dyn l10n::Translations) {
    println!("{}", trans.gettext_fmt("Conversion ended: {0} converted, {1} failed", vec![
        &report.converted_count().to_string(),
        &report.failed_count().to_string(),
    ]));

    for (input, reason) in report.failures() {
        eprintln!("{}", trans.gettext_fmt("Conversion failed: {0}", vec![&input.display().to_string()]));
        eprintln!("  {}", reason);
    }
}
