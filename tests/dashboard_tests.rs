use rdbviz::dashboard::{read_stats_file, serve, write_stats_file, write_svg_file, DashboardState};
use rdbviz::error::DashboardError;
use rdbviz::render::Layout;
use rdbviz::Stats;
use std::net::SocketAddr;
use tempfile::tempdir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

mod helpers;
use helpers::{http_get, sample_stats};

async fn spawn_dashboard(
    state: DashboardState,
) -> (SocketAddr, CancellationToken, JoinHandle<Result<(), DashboardError>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(serve(listener, state, shutdown.clone()));
    (addr, shutdown, handle)
}

// =========================================================================================
// 1. FILE MODE
// =========================================================================================

mod file_mode {
    use super::*;

    #[test]
    fn test_svg_written_to_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dump.svg");

        write_svg_file(&sample_stats(), &Layout::default(), &path).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains(">Keys: 10<"));
    }

    #[test]
    fn test_existing_file_is_replaced() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dump.svg");
        std::fs::write(&path, "stale").unwrap();

        write_svg_file(&sample_stats(), &Layout::default(), &path).unwrap();

        assert!(std::fs::read_to_string(&path).unwrap().starts_with("<?xml"));
    }

    #[test]
    fn test_failed_render_leaves_no_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dump.svg");
        let broken = Layout { columns: 0, ..Layout::default() };

        let result = write_svg_file(&sample_stats(), &broken, &path);

        assert!(matches!(result, Err(DashboardError::Render(_))));
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope").join("dump.svg");

        let result = write_svg_file(&sample_stats(), &Layout::default(), &path);

        assert!(matches!(result, Err(DashboardError::Io { .. })));
    }

    #[test]
    fn test_stats_dump_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stats.json");
        let stats = sample_stats();

        write_stats_file(&stats, &path).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"total_byte_size\""));
        assert!(raw.contains("\"sorted_sets\""));

        assert_eq!(read_stats_file(&path).unwrap(), stats);
    }

    #[test]
    fn test_corrupt_stats_dump_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stats.json");
        std::fs::write(&path, "{\"keys\": 12").unwrap();

        assert!(matches!(read_stats_file(&path), Err(DashboardError::Json(_))));
    }
}

// =========================================================================================
// 2. SERVICE MODE
// =========================================================================================

mod service_mode {
    use super::*;

    #[tokio::test]
    async fn test_serves_svg_at_root() {
        let (addr, shutdown, handle) =
            spawn_dashboard(DashboardState::new(sample_stats(), Layout::default())).await;

        let res = http_get(addr, "/").await;
        assert_eq!(res.status, 200);
        assert!(res.headers.contains("content-type: image/svg+xml"));
        assert!(res.body.contains("<?xml version"));
        assert!(res.body.contains(">Databases: 2<"));

        // Same frozen snapshot on every request
        let again = http_get(addr, "/").await;
        assert_eq!(again.body, res.body);

        shutdown.cancel();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_serves_stats_json() {
        let (addr, shutdown, handle) =
            spawn_dashboard(DashboardState::new(sample_stats(), Layout::default())).await;

        let res = http_get(addr, "/api/stats").await;
        assert_eq!(res.status, 200);
        assert!(res.headers.contains("application/json"));

        let start = res.body.find('{').unwrap();
        let end = res.body.rfind('}').unwrap();
        let stats: Stats = serde_json::from_str(&res.body[start..=end]).unwrap();
        assert_eq!(stats, sample_stats());

        shutdown.cancel();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_render_failure_is_server_error() {
        let broken = Layout { rows: 0, ..Layout::default() };
        let (addr, shutdown, handle) = spawn_dashboard(DashboardState::new(sample_stats(), broken)).await;

        let res = http_get(addr, "/").await;
        assert_eq!(res.status, 500);
        assert!(res.body.contains("invalid layout"));

        shutdown.cancel();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let (addr, shutdown, handle) =
            spawn_dashboard(DashboardState::new(Stats::new(), Layout::default())).await;

        assert_eq!(http_get(addr, "/favicon.ico").await.status, 404);

        shutdown.cancel();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_bind_conflict_is_reported() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = taken.local_addr().unwrap();

        let result = rdbviz::dashboard::start_dashboard_server(
            DashboardState::new(Stats::new(), Layout::default()),
            addr,
            CancellationToken::new(),
        )
        .await;

        assert!(matches!(result, Err(DashboardError::Bind { .. })));
    }
}
