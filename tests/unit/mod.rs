// Test code is allowed to panic on failure
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

//! Unit tests for daisy.
//!
//! These tests run without Sentinel or Redis and exercise the public API
//! the binary is built from.

mod cli_tests {
    use clap::Parser;
    use daisy::RunContext;
    use daisy::cli::{Cli, Command, DEFAULT_SENTINEL, SlavePoolCommand};
    use daisy::client::ReplicaAddress;
    use daisy::pool::{SyncPolicy, plan_assignments};

    fn parse(args: &[&str]) -> RunContext {
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Slavepool {
            command: SlavePoolCommand::Create(create),
        } = &cli.command;
        RunContext::from_args(&cli.global, create).unwrap()
    }

    #[test]
    fn test_default_sentinel_address() {
        let ctx = parse(&["daisy", "-n", "pod1", "slavepool", "create"]);
        assert_eq!(ctx.sentinel.to_string(), DEFAULT_SENTINEL);
    }

    #[test]
    fn test_command_line_to_plan() {
        let ctx = parse(&[
            "daisy",
            "--podname",
            "pod1",
            "slavepool",
            "create",
            "--slaves",
            "10.1.0.1:6380,10.1.0.2:6380,10.1.0.3:6380",
            "--syncpolicy",
            "ring",
        ]);

        let pool = vec![
            ReplicaAddress::new("10.0.0.1", 6379),
            ReplicaAddress::new("10.0.0.2", 6379),
        ];
        let plan = plan_assignments(&ctx.candidates, &pool, ctx.policy).unwrap();

        assert_eq!(plan.policy, SyncPolicy::Ring);
        assert_eq!(plan.assignments[2].candidate.host, "10.1.0.3");
        assert_eq!(plan.assignments[2].source.host, "10.0.0.1");
    }
}

mod policy_tests {
    use daisy::pool::{SyncPolicy, UnknownPolicy};

    #[test]
    fn test_policy_names() {
        assert_eq!(SyncPolicy::NAMES, ["single", "direct", "ring"]);
        for name in SyncPolicy::NAMES {
            assert_eq!(name.parse::<SyncPolicy>().unwrap().as_str(), name);
        }
    }

    #[test]
    fn test_legacy_default_is_rejected() {
        assert_eq!(
            "singleslave".parse::<SyncPolicy>(),
            Err(UnknownPolicy("singleslave".to_string()))
        );
    }
}

mod report_tests {
    use daisy::client::{ReplicaAddress, parse_master_reply};
    use daisy::pool::{RunReport, SyncPolicy};

    #[test]
    fn test_empty_report_json_shape() {
        let report = RunReport::empty("pod1", SyncPolicy::Direct, true);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["pod"], "pod1");
        assert_eq!(json["policy"], "direct");
        assert_eq!(json["dry_run"], true);
        assert!(json["master"].is_null());
        assert_eq!(json["outcomes"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_master_reply_feeds_report() {
        let master =
            parse_master_reply(Some(vec!["10.0.0.1".to_string(), "6379".to_string()])).unwrap();
        let mut report = RunReport::empty("pod1", SyncPolicy::Single, false);
        report.master = master;

        assert_eq!(report.master, Some(ReplicaAddress::new("10.0.0.1", 6379)));
        assert!(report.to_text().contains("master 10.0.0.1:6379"));
    }
}
