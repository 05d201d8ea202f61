//! Topo Studio - Live Device-Topology Dashboard
//! Runs the panel against a simulated sensor fleet so the whole engine is
//! drivable offline.

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use eframe::egui;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use topo_studio::scene::{AttributeInfo, RoomInfo, SensorInfo, UserInfo};
use topo_studio::{
    ActivityEvent, AttentionEvent, AttentionLevel, EngineConfig, PanelTheme, TelemetryEvent,
    TopologyEngine, TopologyPanel, TopologySnapshot,
};

#[derive(Parser, Debug)]
#[command(name = "topo-studio", about = "Live device-topology dashboard panel")]
struct Args {
    /// Number of simulated connector users
    #[arg(long, default_value_t = 6)]
    users: usize,

    /// Sensors per user
    #[arg(long, default_value_t = 3)]
    sensors: usize,

    /// Telemetry events per second across the fleet
    #[arg(long, default_value_t = 12.0)]
    rate: f32,

    /// Periodically add/remove sensors to exercise topology diffing
    #[arg(long, default_value_t = true)]
    churn: bool,

    /// Use the light theme
    #[arg(long)]
    light: bool,

    /// Engine config overrides (JSON file)
    #[arg(long)]
    config: Option<PathBuf>,

    /// RNG seed for the simulated fleet
    #[arg(long, default_value_t = 7)]
    seed: u64,
}

fn load_config(path: &PathBuf) -> anyhow::Result<EngineConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading engine config {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing engine config {}", path.display()))
}

/// Simulated sensor fleet feeding the engine
struct FleetSimulator {
    rng: StdRng,
    snapshot: TopologySnapshot,
    rate: f32,
    churn: bool,
    next_sensor: usize,
    last_telemetry: Instant,
    last_churn: Instant,
    last_attention: Instant,
}

const ATTR_TYPES: [&str; 4] = ["heart_rate", "temperature", "humidity", "motion"];

impl FleetSimulator {
    fn new(args: &Args) -> Self {
        let mut snapshot = TopologySnapshot {
            rooms: vec![RoomInfo { id: "room-main".to_string(), name: "Main Hall".to_string() }],
            ..Default::default()
        };
        let mut next_sensor = 0;
        for u in 0..args.users {
            let uid = format!("connector-{:02}", u);
            snapshot
                .users
                .push(UserInfo { connector_id: uid.clone(), sensor_count: args.sensors });
            for _ in 0..args.sensors {
                let sid = format!("sensor-{:03}", next_sensor);
                next_sensor += 1;
                let mut attributes = BTreeMap::new();
                for (a, ty) in ATTR_TYPES.iter().take(2 + next_sensor % 3).enumerate() {
                    attributes
                        .insert(format!("attr-{}", a), AttributeInfo { attr_type: ty.to_string() });
                }
                snapshot
                    .sensors
                    .insert(sid, SensorInfo { user_id: uid.clone(), label: String::new(), attributes });
            }
        }

        let now = Instant::now();
        Self {
            rng: StdRng::seed_from_u64(args.seed),
            snapshot,
            rate: args.rate,
            churn: args.churn,
            next_sensor,
            last_telemetry: now,
            last_churn: now,
            last_attention: now,
        }
    }

    fn initial_snapshot(&self) -> TopologySnapshot {
        self.snapshot.clone()
    }

    /// Drive the engine with whatever the fleet produced since the last frame
    fn pump(&mut self, engine: &mut TopologyEngine, now: Instant) {
        let interval = Duration::from_secs_f32(1.0 / self.rate.max(0.1));
        while now.saturating_duration_since(self.last_telemetry) >= interval {
            self.last_telemetry += interval;
            self.emit_telemetry(engine, now);
        }

        if now.saturating_duration_since(self.last_attention) >= Duration::from_secs(4) {
            self.last_attention = now;
            self.emit_attention(engine, now);
        }

        if self.churn && now.saturating_duration_since(self.last_churn) >= Duration::from_secs(9) {
            self.last_churn = now;
            self.churn_topology(engine, now);
        }
    }

    fn random_sensor(&mut self) -> Option<(String, SensorInfo)> {
        if self.snapshot.sensors.is_empty() {
            return None;
        }
        let index = self.rng.gen_range(0..self.snapshot.sensors.len());
        self.snapshot
            .sensors
            .iter()
            .nth(index)
            .map(|(id, info)| (id.clone(), info.clone()))
    }

    fn emit_telemetry(&mut self, engine: &mut TopologyEngine, now: Instant) {
        let Some((sensor_id, info)) = self.random_sensor() else {
            return;
        };
        let Some((attr_id, attr)) = info
            .attributes
            .iter()
            .nth(self.rng.gen_range(0..info.attributes.len().max(1)))
            .map(|(id, a)| (id.clone(), a.clone()))
        else {
            return;
        };

        let payload = match attr.attr_type.as_str() {
            "heart_rate" => json!(self.rng.gen_range(55..160)),
            "temperature" => json!(18.0 + self.rng.gen::<f64>() * 8.0),
            "humidity" => json!({"value": self.rng.gen_range(30..70)}),
            _ => json!(self.rng.gen_range(0..2)),
        };

        engine.handle_telemetry(
            &TelemetryEvent {
                sensor_id: sensor_id.clone(),
                attribute_id: attr_id.clone(),
                payload,
                timestamp: Utc::now(),
            },
            now,
        );
        engine.handle_activity(
            &ActivityEvent { sensor_id, attribute_ids: vec![attr_id] },
            now,
        );
    }

    fn emit_attention(&mut self, engine: &mut TopologyEngine, now: Instant) {
        let Some((sensor_id, _)) = self.random_sensor() else {
            return;
        };
        let level = match self.rng.gen_range(0..4) {
            0 => AttentionLevel::High,
            1 => AttentionLevel::Medium,
            2 => AttentionLevel::Low,
            _ => AttentionLevel::None,
        };
        engine.handle_attention(&AttentionEvent { sensor_id, level }, now);
    }

    /// Randomly retire one sensor and enroll another, then push the new truth
    fn churn_topology(&mut self, engine: &mut TopologyEngine, now: Instant) {
        if let Some((victim, _)) = self.random_sensor() {
            self.snapshot.sensors.remove(&victim);
        }

        if let Some(user) = self.snapshot.users.first().cloned() {
            let sid = format!("sensor-{:03}", self.next_sensor);
            self.next_sensor += 1;
            let mut attributes = BTreeMap::new();
            attributes.insert(
                "attr-0".to_string(),
                AttributeInfo { attr_type: "heart_rate".to_string() },
            );
            self.snapshot.sensors.insert(
                sid,
                SensorInfo {
                    user_id: user.connector_id,
                    label: String::new(),
                    attributes,
                },
            );
        }

        engine.apply_topology(self.snapshot.clone(), now);
    }
}

struct TopoStudioApp {
    panel: TopologyPanel,
    sim: FleetSimulator,
}

impl TopoStudioApp {
    fn new(args: &Args) -> Self {
        let config = match &args.config {
            Some(path) => load_config(path).unwrap_or_else(|e| {
                log::warn!("falling back to default engine config: {:#}", e);
                EngineConfig::default()
            }),
            None => EngineConfig::default(),
        };
        let theme = if args.light { PanelTheme::light() } else { PanelTheme::dark() };

        let mut engine = TopologyEngine::new(config, theme);
        let sim = FleetSimulator::new(args);
        engine.apply_topology(sim.initial_snapshot(), Instant::now());

        Self { panel: TopologyPanel::new(engine), sim }
    }
}

impl eframe::App for TopoStudioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.sim.pump(&mut self.panel.engine, now);

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                self.panel.ui(ui);
            });

        // The fleet keeps producing even when the engine itself is idle
        ctx.request_repaint_after(Duration::from_millis(50));
    }
}

fn main() -> eframe::Result<()> {
    env_logger::init();
    let args = Args::parse();
    log::info!(
        "starting fleet: {} users x {} sensors, {:.1} ev/s",
        args.users,
        args.sensors,
        args.rate
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 780.0])
            .with_title("Topo Studio"),
        ..Default::default()
    };

    eframe::run_native(
        "topo-studio",
        options,
        Box::new(move |_cc| Ok(Box::new(TopoStudioApp::new(&args)))),
    )
}
