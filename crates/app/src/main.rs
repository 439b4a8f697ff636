//! Interactive field viewer.
//!
//! Controls:
//! - W/A/S/D or arrow keys: move up/left/down/right on screen
//! - Q/E: rotate counterclockwise/clockwise on screen
//! - Z/X: rotate the selected peripheral
//! - Space: enable/disable the robot

mod canvas;
mod trace;

use std::cell::RefCell;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use std::str::FromStr;
use std::time::{Duration, Instant};

use clap::Parser;
use control::{DriveLimits, KinematicController};
use eframe::egui;
use egui_plot::{Legend, Line, Plot, PlotBounds};
use field::{Field, RecordingSurface};
use log::LevelFilter;
use simcore::{Axis, Config, ConfigError, Model, Pose, RobotController};
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use thiserror::Error;

use crate::canvas::Canvas;
use crate::trace::Trace;

const MAX_FRAME_DT: f64 = 0.05;
const PLOT_DT: f64 = 1e-2;
const PERIPHERAL_RATE: f64 = 1.0;

#[derive(Parser, Debug)]
#[command(name = "fieldsim", about = "2D field viewer for robot simulations")]
struct Args {
    /// Simulation configuration (JSON)
    #[arg(short, long, default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/sim_config.json"))]
    config: PathBuf,

    /// off, error, warn, info, debug or trace
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("window error: {0}")]
    Eframe(#[from] eframe::Error),
}

fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = match LevelFilter::from_str(&args.log_level) {
        Ok(level) => level,
        Err(_) => {
            eprintln!("Invalid log level: {}", args.log_level);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = TermLogger::init(
        log_level,
        simplelog::Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ) {
        eprintln!("logger init failed: {e}");
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), AppError> {
    let config = load_config(&args.config)?;
    log::info!("sim type `{}`, axis {:?}", config.sim_type, config.axis);

    let title = format!("Field - {}", config.sim_type);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title(&title),
        ..Default::default()
    };
    eframe::run_native(&title, options, Box::new(|_cc| Ok(Box::new(App::new(config)))))?;
    Ok(())
}

/// Load the configuration; a relative image path is taken relative to the
/// configuration file.
fn load_config(path: &std::path::Path) -> Result<Config, ConfigError> {
    let mut config = Config::load(path)?;
    if let (Some(image), Some(dir)) = (&mut config.field.image, path.parent()) {
        if image.is_relative() {
            *image = dir.join(&*image);
        }
    }
    Ok(config)
}

/// Per-axis key state to a normalized command.
fn axis(positive: bool, negative: bool) -> f64 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}

/// Held movement keys, in screen directions.
#[derive(Debug, Clone, Copy, Default)]
struct DriveKeys {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
    ccw: bool,
    cw: bool,
}

impl DriveKeys {
    /// Field-frame `(vx, vy, omega)` command that moves the robot the way
    /// the keys point on screen. With `YDown` the screen y axis and the
    /// rotation sense are both reversed.
    fn command(&self, field_axis: Axis) -> (f64, f64, f64) {
        let vx = axis(self.right, self.left);
        match field_axis {
            Axis::YUp => (vx, axis(self.up, self.down), axis(self.ccw, self.cw)),
            Axis::YDown => (vx, axis(self.down, self.up), axis(self.cw, self.ccw)),
        }
    }
}

struct App {
    controller: Rc<RefCell<KinematicController>>,
    field: Field<RecordingSurface>,
    axis: Axis,
    canvas: Canvas,

    t: f64,
    paused: bool,
    last_frame: Instant,
    sim_speed: f64,
    window_s: f64,

    selected_peripheral: Option<String>,
    /// Set when an update fails; the field is no longer redrawn.
    halted: Option<String>,

    trace: Trace,
}

impl App {
    fn new(config: Config) -> Self {
        let start = Pose::new(
            config.robot.starting_x,
            config.robot.starting_y,
            config.robot.starting_heading(),
        );
        let controller = Rc::new(RefCell::new(KinematicController::new(start, DriveLimits::default())));
        let field = field::build_field(&config, RecordingSurface::new(), controller.clone());
        let selected_peripheral = config.robot.objects.first().map(|p| p.name.clone());
        let window_s = 10.0;

        Self {
            controller,
            field,
            axis: config.axis,
            canvas: Canvas::new(),
            t: 0.0,
            paused: false,
            last_frame: Instant::now(),
            sim_speed: 1.0,
            window_s,
            selected_peripheral,
            halted: None,
            trace: Trace::new(window_s, PLOT_DT),
        }
    }

    fn reset(&mut self) {
        self.controller.borrow_mut().reset();
        self.t = 0.0;
        self.trace.clear();
        self.halted = None;
        self.last_frame = Instant::now();
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        let (keys, joint, toggle) = ctx.input(|i| {
            let keys = DriveKeys {
                up: i.key_down(egui::Key::W) || i.key_down(egui::Key::ArrowUp),
                down: i.key_down(egui::Key::S) || i.key_down(egui::Key::ArrowDown),
                left: i.key_down(egui::Key::A) || i.key_down(egui::Key::ArrowLeft),
                right: i.key_down(egui::Key::D) || i.key_down(egui::Key::ArrowRight),
                ccw: i.key_down(egui::Key::Q),
                cw: i.key_down(egui::Key::E),
            };
            (
                keys,
                axis(i.key_down(egui::Key::Z), i.key_down(egui::Key::X)),
                i.key_pressed(egui::Key::Space),
            )
        });
        let (vx, vy, omega) = keys.command(self.axis);

        let mut controller = self.controller.borrow_mut();
        controller.set_drive(vx, vy, omega);
        if toggle {
            let enabled = controller.enabled();
            controller.set_enabled(!enabled);
        }
        if let Some(name) = &self.selected_peripheral {
            if let Err(e) = controller.set_peripheral_rate(name, joint * PERIPHERAL_RATE) {
                log::warn!("{e}");
            }
        }
    }

    fn tick(&mut self, sim_dt: f64) {
        self.controller.borrow_mut().step(sim_dt);
        self.t += sim_dt;
        let pose = self.controller.borrow().pose();
        self.trace.push(self.t, pose);

        if self.halted.is_some() {
            return;
        }
        if let Err(e) = self.field.update_widgets() {
            log::error!("field update failed: {e}");
            self.halted = Some(e.to_string());
        }
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            if ui.button(if self.paused { "Resume" } else { "Pause" }).clicked() {
                self.paused = !self.paused;
            }
            if ui.button("Reset").clicked() {
                self.reset();
            }

            ui.separator();
            ui.label("Sim speed");
            ui.add(egui::Slider::new(&mut self.sim_speed, 0.1..=4.0).logarithmic(true).suffix("x"));

            ui.separator();
            let names: Vec<String> = self.controller.borrow().peripheral_names().map(str::to_owned).collect();
            if !names.is_empty() {
                egui::ComboBox::from_label("Peripheral")
                    .selected_text(self.selected_peripheral.as_deref().unwrap_or("-"))
                    .show_ui(ui, |ui| {
                        for name in names {
                            let label = name.clone();
                            ui.selectable_value(&mut self.selected_peripheral, Some(name), label);
                        }
                    });
                ui.separator();
            }

            let (pose, enabled) = {
                let controller = self.controller.borrow();
                (controller.pose(), controller.enabled())
            };
            ui.label(format!(
                "Pose: x={:.2} y={:.2} heading={:.1} deg",
                pose.x,
                pose.y,
                pose.heading.to_degrees()
            ));
            ui.colored_label(
                if enabled { egui::Color32::GREEN } else { egui::Color32::GRAY },
                if enabled { "Enabled" } else { "Disabled" },
            );
            if let Some(err) = &self.halted {
                ui.colored_label(egui::Color32::RED, err);
            }
        });
        ui.label("W/A/S/D or arrows: move on screen, Q/E: rotate, Z/X: peripheral, Space: enable/disable, Reset: resume after an error");
    }

    fn plots(&self, ui: &mut egui::Ui) {
        let x_min = (self.t - self.window_s).max(0.0);
        let x_max = self.t.max(self.window_s * 0.1);

        ui.columns(2, |columns| {
            columns[0].heading("Position (ft)");
            Plot::new("position_plot")
                .legend(Legend::default())
                .allow_scroll(false)
                .height(150.0)
                .show(&mut columns[0], |plot_ui| {
                    let (cols, rows) = (self.field.cols() as f64, self.field.rows() as f64);
                    plot_ui.set_plot_bounds(PlotBounds::from_min_max([x_min, 0.0], [x_max, cols.max(rows)]));
                    plot_ui.line(Line::new("x", Trace::line(&self.trace.x, &self.trace.t)));
                    plot_ui.line(Line::new("y", Trace::line(&self.trace.y, &self.trace.t)));
                });

            columns[1].heading("Heading (deg)");
            Plot::new("heading_plot")
                .legend(Legend::default())
                .allow_scroll(false)
                .height(150.0)
                .show(&mut columns[1], |plot_ui| {
                    plot_ui.set_plot_bounds(PlotBounds::from_min_max([x_min, -360.0], [x_max, 360.0]));
                    plot_ui.line(Line::new("heading", Trace::line(&self.trace.heading_deg, &self.trace.t)));
                });
        });
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_keyboard(ctx);

        if !self.paused {
            let now = Instant::now();
            let wall_dt = now.duration_since(self.last_frame).as_secs_f64();
            self.last_frame = now;
            let sim_dt = (wall_dt * self.sim_speed).min(MAX_FRAME_DT);
            self.tick(sim_dt);
        } else {
            self.last_frame = Instant::now();
        }

        egui::TopBottomPanel::top("controls").show(ctx, |ui| self.controls(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::both().max_height((ui.available_height() - 200.0).max(120.0)).show(ui, |ui| {
                self.canvas.show(ui, self.field.surface());
            });
            ui.separator();
            self.plots(ui);
        });

        ctx.request_repaint_after(Duration::from_millis(10));
    }
}
