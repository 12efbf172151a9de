use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use serde_json::json;
use utilkit::config::ToolkitConfig;
use utilkit::logging::{filters, with_fields, LogEvent, LogLevel, LogManager, Mdc};

use crate::fixtures::TestFixtures;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_info_routes_by_threshold() {
        let (manager, all, errors) = TestFixtures::memory_manager(LogLevel::Info);
        let logger = manager.logger("app.service");

        assert_eq!(logger.trace("hidden"), 0);
        assert_eq!(logger.debug("hidden"), 0);
        assert_eq!(logger.info("visible"), 1);
        assert_eq!(logger.error("broken"), 2);
        assert_eq!(logger.fatal("down"), 2);

        assert_eq!(all.messages(), vec!["visible", "broken", "down"]);
        assert_eq!(errors.messages(), vec!["broken", "down"]);
    }

    #[test]
    fn test_per_logger_levels_and_filters() {
        let (manager, all, _errors) = TestFixtures::memory_manager(LogLevel::Warn);
        manager.set_log_level("app.db", LogLevel::Debug);

        let db = manager.logger("app.db.query");
        let web = manager.logger("app.web");
        db.debug("db debug");
        web.info("web info");
        web.warn("web warn");
        assert_eq!(all.messages(), vec!["db debug", "web warn"]);

        all.clear();
        manager.add_filter("no-health", Arc::new(|event: &LogEvent| !event.message().contains("health")));
        manager.add_filter("db-only", filters::by_logger(["app.db"]));
        db.info("health check");
        db.info("query done");
        web.error("web down");
        assert_eq!(all.messages(), vec!["query done"]);

        assert!(manager.remove_filter("db-only"));
        web.error("web down");
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_scoped_context_survives_panic() {
        let (manager, all, _errors) = TestFixtures::memory_manager(LogLevel::Info);
        let logger = manager.logger("app.jobs");
        Mdc::put("tenant", "outer");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            with_fields([("tenant", json!("inner")), ("jobId", json!(7))], || {
                logger.info("inside");
                panic!("job failed");
            })
        }));

        assert!(outcome.is_err());
        assert_eq!(Mdc::get("tenant"), Some(json!("outer")));
        assert!(!Mdc::contains("jobId"));

        logger.info("after");
        let events = all.events();
        assert_eq!(events[0].field("tenant"), Some(&json!("inner")));
        assert_eq!(events[0].field("jobId"), Some(&json!(7)));
        assert_eq!(events[1].field("tenant"), Some(&json!("outer")));
        assert_eq!(events[1].field("jobId"), None);
        Mdc::clear();
    }

    #[test]
    fn test_context_is_per_thread() {
        let (manager, all, _errors) = TestFixtures::memory_manager(LogLevel::Info);
        Mdc::put("side", "main");

        let worker_manager = Arc::clone(&manager);
        thread::spawn(move || {
            worker_manager.logger("app.worker").info("from worker");
        })
        .join()
        .unwrap();

        let events = all.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].field("side"), None);
        Mdc::clear();
    }

    #[test]
    fn test_performance_summary_event() {
        let (manager, all, _errors) = TestFixtures::memory_manager(LogLevel::Info);
        let logger = manager.logger("app.perf");
        {
            let mut tracker = logger.track_performance("import");
            tracker.checkpoint("parse");
            tracker.checkpoint("store");
        }

        let events = all.events();
        assert_eq!(events.len(), 1);
        let summary = &events[0];
        assert_eq!(summary.message(), "Performance tracking completed for operation: import");
        assert_eq!(summary.field("operation"), Some(&json!("import")));
        assert!(summary.field("totalDurationMs").is_some());
        assert!(summary.field("checkpoint.parse.ms").is_some());
        assert!(summary.field("checkpoint.store.ms").is_some());
    }

    #[test]
    fn test_manager_from_config_file() {
        let mut config = ToolkitConfig::load(&TestFixtures::sample_config_path()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("logs/events.jsonl");
        config.logging.json_file = Some(json_path.clone());

        let manager = Arc::new(LogManager::from_config(&config.logging).unwrap());
        assert_eq!(manager.appender_names(), vec!["json", "memory"]);
        assert_eq!(manager.effective_level("app.db.pool.conn"), LogLevel::Error);

        manager.logger("app.db").debug("db detail");
        manager.logger("app.db.pool").warn("pool warning");
        manager.logger("other").info("other info");

        let retained = manager.retained_events("memory").unwrap();
        let messages: Vec<&str> = retained.iter().map(|e| e.message()).collect();
        assert_eq!(messages, vec!["db detail", "other info"]);

        let written = std::fs::read_to_string(&json_path).unwrap();
        let lines: Vec<serde_json::Value> = written
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["level"], "DEBUG");
        assert_eq!(lines[0]["logger"], "app.db");
    }
}
