use assert_cmd::Command;
use manweave_core::AnyEmptyResult;

fn write_widget_source(root: &std::path::Path, content: &str) -> AnyEmptyResult {
	let src = root.join("src");
	std::fs::create_dir_all(&src)?;
	std::fs::write(src.join("widget.rs"), content)?;
	Ok(())
}

#[test]
fn collect_writes_manual_tree() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_widget_source(
		tmp.path(),
		"/*# widgets man\n *# title: Widgets\n * Widgets overview.\n */\nfn demo() {}\n",
	)?;

	let mut cmd = Command::cargo_bin("manweave")?;
	cmd.env("NO_COLOR", "1")
		.arg("collect")
		.arg("--path")
		.arg(tmp.path())
		.arg("--output")
		.arg(tmp.path().join("out"))
		.assert()
		.success()
		.stdout(predicates::str::contains("Collected 1 manual(s)"));

	let manual = tmp.path().join("out").join("widgets").join("widget0000.adoc");
	let text = std::fs::read_to_string(&manual)?;
	assert!(text.contains("Widgets overview."));
	assert!(manual.with_extension("adoc.meta").is_file());

	Ok(())
}

#[test]
fn collect_generates_index_with_flag() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_widget_source(
		tmp.path(),
		"/*# widgets man\n * first\n */\n/*# widgets man\n * second\n */\n",
	)?;

	let mut cmd = Command::cargo_bin("manweave")?;
	cmd.env("NO_COLOR", "1")
		.arg("collect")
		.arg("--index")
		.arg("--path")
		.arg(tmp.path())
		.arg("--output")
		.arg(tmp.path().join("out"))
		.assert()
		.success();

	let index =
		std::fs::read_to_string(tmp.path().join("out").join("widgets").join("index.adoc"))?;
	assert!(index.contains("include::widget0000.adoc[]"));
	assert!(index.contains("include::widget0001.adoc[]"));

	Ok(())
}

#[test]
fn collect_property_overrides_resolve_in_bodies() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_widget_source(tmp.path(), "/*# widgets man\n * {{product}} manual.\n */\n")?;

	let mut cmd = Command::cargo_bin("manweave")?;
	cmd.env("NO_COLOR", "1")
		.arg("collect")
		.arg("--property")
		.arg("product=Gadget")
		.arg("--path")
		.arg(tmp.path())
		.arg("--output")
		.arg(tmp.path().join("out"))
		.assert()
		.success();

	let text = std::fs::read_to_string(
		tmp.path().join("out").join("widgets").join("widget0000.adoc"),
	)?;
	assert!(text.contains("Gadget manual."));

	Ok(())
}

#[test]
fn collect_reads_project_config_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_widget_source(tmp.path(), "/*# widgets man\n * body\n */\n")?;
	std::fs::write(
		tmp.path().join("manweave.toml"),
		"output = \"docs/manual\"\ntext_header = \"= {{category}}\\\\n\\\\n\"\n",
	)?;

	let mut cmd = Command::cargo_bin("manweave")?;
	cmd.env("NO_COLOR", "1")
		.arg("collect")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	let manual = tmp
		.path()
		.join("docs")
		.join("manual")
		.join("widgets")
		.join("widget0000.adoc");
	let text = std::fs::read_to_string(manual)?;
	assert!(text.starts_with("= widgets\n\n"));

	Ok(())
}

#[test]
fn collect_rejects_malformed_property_override() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_widget_source(tmp.path(), "/*# widgets man\n * body\n */\n")?;

	let mut cmd = Command::cargo_bin("manweave")?;
	cmd.env("NO_COLOR", "1")
		.arg("collect")
		.arg("--property")
		.arg("missing-separator")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.failure()
		.code(2)
		.stderr(predicates::str::contains("invalid property override"));

	Ok(())
}

#[test]
fn collect_cleanup_removes_stale_output() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_widget_source(tmp.path(), "/*# widgets man\n * body\n */\n")?;
	let out = tmp.path().join("out");
	std::fs::create_dir_all(&out)?;
	std::fs::write(out.join("stale.txt"), "old run")?;

	let mut cmd = Command::cargo_bin("manweave")?;
	cmd.env("NO_COLOR", "1")
		.arg("collect")
		.arg("--cleanup")
		.arg("--path")
		.arg(tmp.path())
		.arg("--output")
		.arg(&out)
		.assert()
		.success();

	assert!(!out.join("stale.txt").exists());
	assert!(out.join("widgets").join("widget0000.adoc").is_file());

	Ok(())
}
