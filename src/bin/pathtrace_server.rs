//! Pathtrace Server - Unix socket server for a path search session
//!
//! Provides a MessagePack-based protocol for editing a graph, running
//! searches and playing back their animation traces.
//! Multiple clients can connect and share the same session.
//!
//! Usage:
//!   pathtrace-server [--socket /tmp/pathtrace.sock] [--graph graph.json]
//!                    [--speed medium] [--log-level info]
//!
//! Protocol:
//!   Request:  [4-byte length BE] [MessagePack payload]
//!   Response: [4-byte length BE] [MessagePack payload]

use std::io::{Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

use pathtrace::graph::{GraphStore, PathResult, Strategy};
use pathtrace::session::Session;
use pathtrace::storage::GraphSnapshot;
use pathtrace::trace::{
    AnimationStep, HighlightState, PlaybackSpeed, PlayerStatus, TickControl, Ticker,
};
use pathtrace::GraphEngine;

const DEFAULT_SOCKET: &str = "/tmp/pathtrace.sock";
const MAX_MESSAGE_LEN: usize = 100 * 1024 * 1024;

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct ServerConfig {
    socket_path: PathBuf,
    graph_path: Option<PathBuf>,
    speed: PlaybackSpeed,
    log_level: tracing::Level,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET),
            graph_path: None,
            speed: PlaybackSpeed::default(),
            log_level: tracing::Level::INFO,
        }
    }
}

impl ServerConfig {
    /// Flags win over environment variables, which win over defaults
    fn parse<F>(args: &[String], env: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |name: &str| -> anyhow::Result<Option<String>> {
            match args.iter().position(|a| a == name) {
                None => Ok(None),
                Some(i) => args
                    .get(i + 1)
                    .cloned()
                    .map(Some)
                    .ok_or_else(|| anyhow!("{} requires a value", name)),
            }
        };

        let mut config = ServerConfig::default();

        if let Some(socket) = flag("--socket")?.or_else(|| env("PATHTRACE_SOCKET")) {
            config.socket_path = PathBuf::from(socket);
        }
        config.graph_path = flag("--graph")?.map(PathBuf::from);
        if let Some(speed) = flag("--speed")?.or_else(|| env("PATHTRACE_SPEED")) {
            config.speed = speed.parse().map_err(|e: String| anyhow!(e))?;
        }
        if let Some(level) = flag("--log-level")?.or_else(|| env("PATHTRACE_LOG")) {
            config.log_level = level
                .parse()
                .with_context(|| format!("Invalid log level: {}", level))?;
        }

        Ok(config)
    }
}

fn print_usage() {
    eprintln!("Usage: pathtrace-server [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --socket <path>      Unix socket path (default: {}, env PATHTRACE_SOCKET)", DEFAULT_SOCKET);
    eprintln!("  --graph <file>       JSON graph to load at startup");
    eprintln!("  --speed <speed>      slow | medium | fast | <ms> (env PATHTRACE_SPEED)");
    eprintln!("  --log-level <level>  error | warn | info | debug | trace (env PATHTRACE_LOG)");
}

// ============================================================================
// Wire Protocol Types
// ============================================================================

/// Request from client
#[derive(Debug, Deserialize)]
#[serde(tag = "cmd", rename_all = "camelCase")]
pub enum Request {
    // Graph edits
    AddNode { id: String, x: f64, y: f64 },
    MoveNode { id: String, x: f64, y: f64 },
    DeleteNode { id: String },
    AddEdge {
        src: String,
        dst: String,
        weight: f64,
        #[serde(default)]
        directed: bool,
    },
    DeleteEdge { src: String, dst: String },
    LoadGraph { graph: GraphSnapshot },
    GetGraph,
    Clear,

    // Search
    SelectEndpoints { start: Option<String>, end: Option<String> },
    SetReverse { reverse: bool },
    ComputePath { strategy: Option<String> },

    // Playback
    StepCount,
    StepAt { index: usize },
    Play,
    Pause,
    Tick,
    Seek { index: usize },
    Reset,
    SetSpeed { speed: String },
    Highlight,

    // Control
    Ping,
    Shutdown,
}

/// Response to client
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Response {
    Ok { ok: bool },
    Error { error: String },
    Graph {
        graph: GraphSnapshot,
        /// Bumped by every structural edit; clients compare it to spot stale views
        revision: usize,
    },
    Path {
        path: Option<PathResult>,
        strategy: Strategy,
        #[serde(rename = "stepCount")]
        step_count: usize,
    },
    Count { count: usize },
    Step { step: Option<AnimationStep> },
    Playing { playing: bool },
    Highlight {
        highlight: HighlightState,
        cursor: usize,
        status: Option<PlayerStatus>,
    },
    Pong { pong: bool, version: String },
}

impl Response {
    fn error(e: impl std::fmt::Display) -> Self {
        Response::Error { error: e.to_string() }
    }
}

fn graph_response(session: &Session, result: pathtrace::Result<GraphSnapshot>) -> Response {
    match result {
        Ok(graph) => Response::Graph { graph, revision: session.graph().revision() },
        Err(e) => Response::error(e),
    }
}

fn highlight_response(session: &Session) -> Response {
    Response::Highlight {
        highlight: session.highlight(),
        cursor: session.player().map_or(0, |p| p.cursor()),
        status: session.player().map(|p| p.status()),
    }
}

// ============================================================================
// Request Handler
// ============================================================================

fn handle_request(session: &mut Session, request: Request) -> Response {
    match request {
        // Graph edits
        Request::AddNode { id, x, y } => {
            let result = session.add_node(id, x, y);
            graph_response(session, result)
        }
        Request::MoveNode { id, x, y } => {
            if !session.graph().node_exists(&id) {
                return Response::error(format!("Node not found: {}", id));
            }
            let graph = session.move_node(&id, x, y);
            graph_response(session, Ok(graph))
        }
        Request::DeleteNode { id } => {
            let graph = session.delete_node(&id);
            graph_response(session, Ok(graph))
        }
        Request::AddEdge { src, dst, weight, directed } => {
            let result = session.add_edge(&src, &dst, weight, directed);
            graph_response(session, result)
        }
        Request::DeleteEdge { src, dst } => {
            let graph = session.delete_edge(&src, &dst);
            graph_response(session, Ok(graph))
        }
        Request::LoadGraph { graph } => {
            let result = session.load(graph);
            graph_response(session, result)
        }
        Request::GetGraph => graph_response(session, Ok(session.snapshot())),
        Request::Clear => {
            let graph = session.clear();
            graph_response(session, Ok(graph))
        }

        // Search
        Request::SelectEndpoints { start, end } => {
            session.select(start, end);
            Response::Ok { ok: true }
        }
        Request::SetReverse { reverse } => {
            session.set_reverse_traversal(reverse);
            Response::Ok { ok: true }
        }
        Request::ComputePath { strategy } => {
            let strategy = match strategy.as_deref().map(str::parse::<Strategy>) {
                None => Strategy::default(),
                Some(Ok(strategy)) => strategy,
                Some(Err(e)) => return Response::error(e),
            };
            let computed = session.compute(strategy);
            Response::Path {
                path: computed.map(|c| c.path.clone()),
                strategy,
                step_count: computed.map_or(0, |c| c.trace.step_count()),
            }
        }

        // Playback
        Request::StepCount => Response::Count {
            count: session.trace().map_or(0, |t| t.step_count()),
        },
        Request::StepAt { index } => Response::Step {
            step: session.trace().and_then(|t| t.step_at(index)).cloned(),
        },
        Request::Play => Response::Playing {
            playing: session.player_mut().map_or(false, |p| p.play()),
        },
        Request::Pause => {
            if let Some(player) = session.player_mut() {
                player.pause();
            }
            highlight_response(session)
        }
        Request::Tick => Response::Step {
            step: session.player_mut().and_then(|p| p.step_forward().cloned()),
        },
        Request::Seek { index } => {
            if let Some(player) = session.player_mut() {
                player.seek(index);
            }
            highlight_response(session)
        }
        Request::Reset => {
            if let Some(player) = session.player_mut() {
                player.reset();
            }
            highlight_response(session)
        }
        Request::SetSpeed { speed } => match speed.parse::<PlaybackSpeed>() {
            Ok(speed) => {
                session.set_speed(speed);
                Response::Ok { ok: true }
            }
            Err(e) => Response::error(e),
        },
        Request::Highlight => highlight_response(session),

        // Control
        Request::Ping => Response::Pong {
            pong: true,
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        Request::Shutdown => Response::Ok { ok: true },
    }
}

// ============================================================================
// Playback
// ============================================================================

/// Session plus the ticker driving its player
struct ServerState {
    session: Arc<Mutex<Session>>,
    ticker: Mutex<Option<Ticker>>,
}

impl ServerState {
    fn new(session: Session) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            ticker: Mutex::new(None),
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the ticker match the player after a request.
    /// Never called with the session locked: the ticker thread takes that
    /// lock on every tick, and stopping a ticker joins its thread.
    fn sync_playback(&self) {
        let (playing, interval) = {
            let session = self.session();
            let playing = session
                .player()
                .map_or(false, |p| p.status() == PlayerStatus::Playing);
            (playing, session.speed().interval())
        };

        let mut slot = self.ticker.lock().unwrap_or_else(PoisonError::into_inner);
        if !playing {
            if let Some(ticker) = slot.take() {
                let ticks = ticker.stop();
                tracing::debug!("Playback stopped after {} ticks", ticks);
            }
            return;
        }

        if let Some(ticker) = slot.as_ref().filter(|t| !t.is_finished()) {
            ticker.set_interval(interval);
            return;
        }
        if let Some(old) = slot.take() {
            old.stop();
        }
        *slot = Some(spawn_ticker(Arc::clone(&self.session), interval));
        tracing::debug!("Playback started at {:?} per step", interval);
    }
}

fn spawn_ticker(session: Arc<Mutex<Session>>, interval: std::time::Duration) -> Ticker {
    Ticker::spawn(interval, move || {
        let mut session = session.lock().unwrap_or_else(PoisonError::into_inner);
        match session.player_mut() {
            Some(player) => {
                if player.tick().is_some() && !player.is_finished() {
                    TickControl::Continue
                } else {
                    TickControl::Stop
                }
            }
            None => TickControl::Stop,
        }
    })
}

// ============================================================================
// Client Connection Handler
// ============================================================================

fn read_message(stream: &mut UnixStream) -> std::io::Result<Option<Vec<u8>>> {
    // Read 4-byte length prefix (big-endian)
    let mut len_buf = [0u8; 4];
    match stream.read_exact(&mut len_buf) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_LEN {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Message too large: {} bytes", len),
        ));
    }

    let mut buf = vec![0u8; len];
    stream.read_exact(&mut buf)?;

    Ok(Some(buf))
}

fn write_message(stream: &mut UnixStream, data: &[u8]) -> std::io::Result<()> {
    let len = data.len() as u32;
    stream.write_all(&len.to_be_bytes())?;
    stream.write_all(data)?;
    stream.flush()?;
    Ok(())
}

/// Serve one client until it disconnects. Returns true if it asked for shutdown.
fn handle_client(mut stream: UnixStream, state: &ServerState, client_id: usize) -> bool {
    tracing::info!("Client {} connected", client_id);

    loop {
        let msg = match read_message(&mut stream) {
            Ok(Some(msg)) => msg,
            Ok(None) => {
                tracing::info!("Client {} disconnected", client_id);
                return false;
            }
            Err(e) => {
                tracing::warn!("Client {} read error: {}", client_id, e);
                return false;
            }
        };

        let (response, is_shutdown) = match rmp_serde::from_slice::<Request>(&msg) {
            Ok(request) => {
                let is_shutdown = matches!(request, Request::Shutdown);
                let response = handle_request(&mut state.session(), request);
                state.sync_playback();
                (response, is_shutdown)
            }
            Err(e) => (Response::error(format!("Invalid request: {}", e)), false),
        };

        // Named encoding keeps field names on the wire
        let resp_bytes = match rmp_serde::to_vec_named(&response) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!("Serialize error: {}", e);
                continue;
            }
        };

        if let Err(e) = write_message(&mut stream, &resp_bytes) {
            tracing::warn!("Client {} write error: {}", client_id, e);
            return false;
        }

        if is_shutdown {
            tracing::info!("Shutdown requested by client {}", client_id);
            return true;
        }
    }
}

// ============================================================================
// Main
// ============================================================================

fn load_session(config: &ServerConfig) -> anyhow::Result<Session> {
    let graph = match &config.graph_path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read graph file {:?}", path))?;
            let snapshot = GraphSnapshot::from_json(&json)
                .with_context(|| format!("Failed to parse graph file {:?}", path))?;
            GraphEngine::from_records(snapshot.nodes, snapshot.edges)
                .with_context(|| format!("Invalid graph in {:?}", path))?
        }
        None => GraphEngine::new(),
    };

    let mut session = Session::new(graph);
    session.set_speed(config.speed);
    Ok(session)
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let config = ServerConfig::parse(&args, |key| std::env::var(key).ok())?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(config.log_level)
        .init();

    let session = load_session(&config)?;
    tracing::info!(
        "Graph loaded: {} nodes, {} edges",
        session.graph().node_count(),
        session.graph().edge_count()
    );
    let state = Arc::new(ServerState::new(session));

    // Remove stale socket file
    let _ = std::fs::remove_file(&config.socket_path);
    let listener = UnixListener::bind(&config.socket_path)
        .with_context(|| format!("Failed to bind socket {:?}", config.socket_path))?;
    tracing::info!("Listening on {:?}", config.socket_path);

    // Set up signal handler for graceful shutdown
    let socket_path_for_signal = config.socket_path.clone();
    let mut signals = signal_hook::iterator::Signals::new([
        signal_hook::consts::SIGINT,
        signal_hook::consts::SIGTERM,
    ])
    .context("Failed to register signal handlers")?;

    thread::spawn(move || {
        if let Some(sig) = signals.forever().next() {
            tracing::info!("Received signal {}, exiting", sig);
            let _ = std::fs::remove_file(&socket_path_for_signal);
            std::process::exit(0);
        }
    });

    // Accept connections
    let mut client_id = 0;
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                client_id += 1;
                let state = Arc::clone(&state);
                let socket_path = config.socket_path.clone();
                thread::spawn(move || {
                    if handle_client(stream, &state, client_id) {
                        let _ = std::fs::remove_file(&socket_path);
                        std::process::exit(0);
                    }
                });
            }
            Err(e) => {
                tracing::warn!("Accept error: {}", e);
            }
        }
    }

    Ok(())
}
