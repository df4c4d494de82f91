//! Integration tests for rails-assets

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn rails_assets() -> Command {
        let mut cmd = cargo_bin_cmd!("rails-assets");
        cmd.env_remove("RAILS_ASSETS_CONFIG")
            .env_remove("CNB_LAYERS_DIR")
            .env_remove("BP_LOG_LEVEL");
        cmd
    }

    #[test]
    fn help_displays() {
        rails_assets()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Usage"))
            .stdout(predicate::str::contains("detect"))
            .stdout(predicate::str::contains("inspect"));
    }

    #[test]
    fn version_displays() {
        rails_assets()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("rails-assets"));
    }

    #[test]
    fn build_requires_layers() {
        rails_assets()
            .arg("build")
            .assert()
            .failure()
            .stderr(predicate::str::contains("--layers"));
    }

    #[test]
    fn detect_passes_for_rails_app() {
        let app = TempDir::new().unwrap();
        fs::create_dir_all(app.path().join("app/assets")).unwrap();
        fs::write(app.path().join("Gemfile"), "gem \"rails\"\n").unwrap();
        fs::write(app.path().join("yarn.lock"), "").unwrap();

        rails_assets()
            .args(["detect", "--working-dir"])
            .arg(app.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("[[requires]]"))
            .stdout(predicate::str::contains(r#"name = "node_modules""#));
    }

    #[test]
    fn detect_fails_without_assets() {
        let app = TempDir::new().unwrap();
        fs::write(app.path().join("Gemfile"), "gem 'rails'\n").unwrap();

        rails_assets()
            .args(["detect", "--working-dir"])
            .arg(app.path())
            .assert()
            .code(100)
            .stdout(predicate::str::contains("failed to find assets in app/assets"));
    }

    #[test]
    fn detect_fails_without_rails() {
        let app = TempDir::new().unwrap();
        fs::create_dir_all(app.path().join("app/javascript")).unwrap();
        fs::write(app.path().join("Gemfile"), "gem 'sinatra'\n").unwrap();

        rails_assets()
            .args(["detect", "--working-dir"])
            .arg(app.path())
            .assert()
            .code(100)
            .stdout(predicate::str::contains("failed to find rails gem in Gemfile"));
    }

    #[test]
    fn inspect_without_layer() {
        let layers = TempDir::new().unwrap();
        rails_assets()
            .args(["inspect", "--format", "json", "--layers"])
            .arg(layers.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("null"));
    }

    #[test]
    fn missing_explicit_config() {
        let app = TempDir::new().unwrap();
        let layers = TempDir::new().unwrap();
        rails_assets()
            .args(["build", "--config", "/nonexistent/assets.toml", "--working-dir"])
            .arg(app.path())
            .arg("--layers")
            .arg(layers.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("Configuration file not found"));
    }
}

#[cfg(unix)]
mod build_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// An application, a layers root, and a fake compiler that counts its runs
    struct Project {
        _root: TempDir,
        app: PathBuf,
        layers: PathBuf,
        counter: PathBuf,
    }

    impl Project {
        fn new(script: &str) -> Self {
            let root = TempDir::new().unwrap();
            let app = root.path().join("app");
            let layers = root.path().join("layers");
            let counter = root.path().join("runs");
            let compiler = root.path().join("fake-bundle");

            fs::create_dir_all(app.join("app/assets/javascripts")).unwrap();
            fs::create_dir_all(&layers).unwrap();
            fs::write(app.join("Gemfile"), "gem 'rails'\n").unwrap();
            fs::write(app.join("app/assets/javascripts/application.js"), "x").unwrap();

            fs::write(&compiler, script).unwrap();
            fs::set_permissions(&compiler, fs::Permissions::from_mode(0o755)).unwrap();
            fs::write(
                app.join(".rails-assets.toml"),
                format!("[build]\ncommand = {:?}\n", compiler.display().to_string()),
            )
            .unwrap();

            Self {
                _root: root,
                app,
                layers,
                counter,
            }
        }

        fn build(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("rails-assets");
            cmd.env_remove("RAILS_ASSETS_CONFIG")
                .env_remove("BP_LOG_LEVEL")
                .env_remove("RAILS_ENV")
                .env("COUNTER_FILE", &self.counter)
                .arg("build")
                .arg("--working-dir")
                .arg(&self.app)
                .arg("--layers")
                .arg(&self.layers);
            cmd
        }

        fn runs(&self) -> usize {
            fs::read_to_string(&self.counter)
                .map(|s| s.lines().count())
                .unwrap_or(0)
        }

        fn layer(&self) -> PathBuf {
            self.layers.join("assets")
        }

        fn record(&self) -> String {
            fs::read_to_string(self.layers.join("assets.toml")).unwrap()
        }
    }

    const COMPILER: &str = r#"#!/bin/sh
echo "$RAILS_ENV $*" >> "$COUNTER_FILE"
echo compiled > public/assets/application.css
echo "Compiled application.css"
"#;

    const FAILING_COMPILER: &str = r#"#!/bin/sh
echo run >> "$COUNTER_FILE"
echo "couldn't find file 'jquery'" >&2
exit 1
"#;

    fn assert_linked(link: &Path, target: &Path) {
        let meta = fs::symlink_metadata(link).unwrap();
        assert!(meta.file_type().is_symlink(), "{} is not a symlink", link.display());
        assert_eq!(fs::read_link(link).unwrap(), target);
    }

    #[test]
    fn builds_then_reuses_then_rebuilds() {
        let project = Project::new(COMPILER);

        project
            .build()
            .assert()
            .success()
            .stdout(predicate::str::contains("Executing build process"))
            .stdout(predicate::str::contains("Configuring launch environment"));
        assert_eq!(project.runs(), 1);

        let invocation = fs::read_to_string(&project.counter).unwrap();
        assert_eq!(
            invocation.trim(),
            "production exec rails assets:precompile assets:clean"
        );

        assert_linked(
            &project.app.join("public/assets"),
            &project.layer().join("public-assets"),
        );
        assert_linked(
            &project.app.join("public/packs"),
            &project.layer().join("public-packs"),
        );
        assert_linked(
            &project.app.join("tmp/cache/assets"),
            &project.layer().join("tmp-cache-assets"),
        );
        assert_eq!(
            fs::read_to_string(project.layer().join("public-assets/application.css")).unwrap(),
            "compiled\n"
        );

        let record = project.record();
        assert!(record.contains("launch = true"));
        assert!(record.contains("cache_sha = "));
        assert!(record.contains("built_at = "));
        assert_eq!(
            fs::read_to_string(project.layer().join("env.launch/RAILS_ENV.default")).unwrap(),
            "production"
        );
        assert_eq!(
            fs::read_to_string(project.layer().join("env.launch/RAILS_SERVE_STATIC_FILES.default"))
                .unwrap(),
            "true"
        );

        // Unchanged sources reuse the layer
        project
            .build()
            .assert()
            .success()
            .stdout(predicate::str::contains("Reusing cached layer"));
        assert_eq!(project.runs(), 1);
        assert_eq!(project.record(), record);
        assert_linked(
            &project.app.join("public/assets"),
            &project.layer().join("public-assets"),
        );

        // Changed sources rebuild
        fs::write(
            project.app.join("app/assets/javascripts/application.js"),
            "y",
        )
        .unwrap();
        project.build().assert().success();
        assert_eq!(project.runs(), 2);
        assert_ne!(project.record(), record);
    }

    #[test]
    fn failed_compile_keeps_previous_metadata() {
        let project = Project::new(COMPILER);
        project.build().assert().success();
        let record = project.record();

        fs::write(
            project.app.join("app/assets/javascripts/application.js"),
            "y",
        )
        .unwrap();
        fs::write(project.app.parent().unwrap().join("fake-bundle"), FAILING_COMPILER).unwrap();

        project
            .build()
            .assert()
            .failure()
            .stderr(predicate::str::contains("failed to execute"))
            .stderr(predicate::str::contains("couldn't find file 'jquery'"));
        assert_eq!(project.runs(), 2);
        assert_eq!(project.record(), record);
    }

    #[test]
    fn extra_paths_from_environment() {
        let project = Project::new(COMPILER);
        fs::create_dir_all(project.app.join("app/frontend")).unwrap();
        fs::write(project.app.join("app/frontend/index.js"), "a").unwrap();

        let build = |cmd: &mut Command| {
            cmd.env("BP_RAILS_ASSETS_EXTRA_SOURCE_PATHS", "app/frontend")
                .env("BP_RAILS_ASSETS_EXTRA_DESTINATION_PATHS", "public/vite")
                .assert()
                .success();
        };

        build(&mut project.build());
        assert_eq!(project.runs(), 1);
        assert_linked(
            &project.app.join("public/vite"),
            &project.layer().join("public-vite"),
        );

        build(&mut project.build());
        assert_eq!(project.runs(), 1);

        fs::write(project.app.join("app/frontend/index.js"), "b").unwrap();
        build(&mut project.build());
        assert_eq!(project.runs(), 2);
    }

    #[test]
    fn inspect_after_build() {
        let project = Project::new(COMPILER);
        project.build().assert().success();

        cargo_bin_cmd!("rails-assets")
            .args(["inspect", "--format", "json", "--layers"])
            .arg(&project.layers)
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""launch": true"#))
            .stdout(predicate::str::contains(r#""RAILS_SERVE_STATIC_FILES": "true""#));
    }
}
