use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use gridsight::board::game::Side;
use gridsight::board::{reconcile, BoardPipeline, BoardState, Calibration, Reconciliation};
use gridsight::config::{read_json, write_json, GridsightConfig};
use gridsight::detect::{load_rgb, locate_pieces, rgb_view, LocatedPiece};
use gridsight::fiducial::MarkerDetection;
use gridsight::pieces::LoosePieceLocator;
use serde::Serialize;

const BOARD_NOT_FOUND: &str = "board not found, retry";
const RECHECK_BOARD: &str = "cannot determine the move, please recheck the board";

/// Read the board and loose pieces from one camera frame.
#[derive(Debug, Parser)]
#[command(author, version, about = "Board-vision pipeline for a 3x3 game robot")]
struct Args {
    /// JSON configuration. Defaults are used if omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Camera frame (PNG, JPEG, ...).
    #[arg(long)]
    image: PathBuf,

    /// JSON array of marker detections for this frame.
    #[arg(long)]
    markers: PathBuf,

    /// Previously trusted board, nine symbols of '.', 'B', 'W' (e.g. "B...W....").
    #[arg(long)]
    previous: Option<BoardState>,

    /// Write the JSON report here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Log debug details to stderr.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    calibration: Option<Calibration>,
    board: Option<BoardState>,
    /// `None` when the piece counts cannot come from alternating play.
    to_move: Option<Side>,
    loose_pieces: Vec<LocatedPiece>,
    reconciliation: Option<Reconciliation>,
    message: Option<&'static str>,
}

fn main() -> ExitCode {
    match try_main() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    #[cfg(feature = "tracing")]
    {
        let _ = verbose;
        gridsight::init_tracing(false);
    }
    #[cfg(not(feature = "tracing"))]
    {
        let level = if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        };
        let _ = gridsight::core::init_with_level(level);
    }
}

fn try_main() -> Result<ExitCode, Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    let cfg = match &args.config {
        Some(path) => GridsightConfig::load_json(path)?,
        None => GridsightConfig::default(),
    };
    let frame = load_rgb(&args.image)?;
    let markers: Vec<MarkerDetection> = read_json(&args.markers)?;

    let mut pipeline = BoardPipeline::new(cfg.board)?;
    let mut report = Report {
        calibration: None,
        board: None,
        to_move: None,
        loose_pieces: Vec::new(),
        reconciliation: None,
        message: None,
    };

    let code = match pipeline.calibrate_from_markers(&markers) {
        Err(e) => {
            log::warn!("calibration failed: {e}");
            report.message = Some(BOARD_NOT_FOUND);
            ExitCode::from(2)
        }
        Ok(calibration) => {
            report.calibration = Some(Calibration::clone(&calibration));
            let board = pipeline.board_state(&rgb_view(&frame))?;
            report.board = Some(board);
            report.to_move = cfg.rules.side_to_move(&board);
            report.loose_pieces =
                locate_pieces(&pipeline, &LoosePieceLocator::new(cfg.pieces), &frame)?;
            if let Some(previous) = args.previous {
                let r = reconcile(previous.cells(), board.cells())?;
                if matches!(r, Reconciliation::Ambiguous { .. }) {
                    report.message = Some(RECHECK_BOARD);
                }
                report.reconciliation = Some(r);
            }
            ExitCode::SUCCESS
        }
    };

    if let Some(message) = report.message {
        eprintln!("{message}");
    }
    match &args.out {
        Some(path) => write_json(path, &report)?,
        None => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(code)
}
