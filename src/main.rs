use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use dialoguer::Confirm;
use gym_asset_ai::analyzer::{
    self, AnalysisBackend, CacheFile, HttpAnalysisClient, JobPoller, PollEvent, PollOutcome, UploadImage,
};
use gym_asset_ai::cli::{AssetCommand, Cli, Commands};
use gym_asset_ai::config::Config;
use gym_asset_ai::error::GymAssetError;
use gym_asset_ai::store::{AssetRepository, AssetStore, JsonFileRepository};
use gym_asset_ai::terminal::{with_spinner, CtrlCHandler};
use gym_asset_ai::{export, logging, scanner};
use gym_asset_common::{
    suggest_assets, AnalysisPayload, Asset, AssetDraft, AssetFilter, AssetUpdate, ImageQualityMetrics,
    JobStatus, StoredAnalysisResult,
};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = Config::load().context("設定ファイルを読み込めません")?;
    let data_dir = config.data_dir(cli.data_dir.clone())?;

    match cli.command {
        Commands::Assess { paths, json, recursive } => {
            run_assess(&config, &paths, json, recursive)?;
        }

        Commands::Scan { image, no_wait, review, use_cache } => {
            println!("📸 gym-asset - 機器スキャン\n");
            run_scan(&config, &data_dir, &image, no_wait, review, use_cache).await?;
        }

        Commands::Status { job_id, wait } => {
            run_status(&config, &job_id, wait).await?;
        }

        Commands::Asset { action } => {
            let mut store = open_store(&data_dir)?;
            run_asset(&mut store, action)?;
        }

        Commands::Log { tag } => {
            let store = open_store(&data_dir)?;
            let logs = store.audit_logs(tag.as_deref());
            if logs.is_empty() {
                println!("変更履歴はありません");
            }
            for log in logs {
                println!(
                    "{}  {:<6} {:<16} {}",
                    log.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    log.action,
                    log.asset_tag,
                    log.details
                );
            }
        }

        Commands::Report { json } => {
            let store = open_store(&data_dir)?;
            let report = store.report();
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("📊 資産サマリー\n");
                println!("  総数: {}", report.total);
                println!("  稼働率: {:.0}%", report.active_ratio() * 100.0);
                println!("\n  稼働状況:");
                for (status, count) in &report.by_status {
                    println!("    {:<12} {}", status, count);
                }
                println!("\n  状態:");
                for (condition, count) in &report.by_condition {
                    println!("    {:<12} {}", condition, count);
                }
                println!("\n  種別:");
                for (kind, count) in &report.by_type {
                    println!("    {:<12} {}", kind, count);
                }
                if !report.needs_attention.is_empty() {
                    println!("\n⚠ 要対応: {}", report.needs_attention.join(", "));
                }
            }
        }

        Commands::Export { format, output, filter } => {
            println!("📄 gym-asset - エクスポート\n");
            let store = open_store(&data_dir)?;
            let filter = filter.into_filter(None);
            let assets = store.search(&filter);
            let output = output.unwrap_or_else(|| PathBuf::from("."));

            println!("- {}件を{}形式で出力中...", assets.len(), format);
            let path = export::export_assets(&assets, format, &output, export::DEFAULT_TITLE)?;
            println!("✔ 出力: {}", path.display());
            println!("\n✅ エクスポート完了");
        }

        Commands::Config { set_api_url, set_api_key, show } => {
            let mut config = config;

            if let Some(url) = set_api_url {
                config.set_api_url(url)?;
                println!("✔ 解析APIのURLを設定しました");
            }

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定:");
                println!("  解析API: {}", config.api_base_url().unwrap_or_else(|_| "未設定".into()));
                println!("  APIキー: {}", if config.api_key().is_some() { "設定済み" } else { "未設定" });
                println!("  最大画像サイズ: {}px", config.max_image_dimension);
                println!("  JPEG品質: {}", config.jpeg_quality);
                println!("  照会間隔: {}秒 / 上限 {}回", config.poll_interval_secs, config.max_poll_attempts);
                println!("  データ: {}", data_dir.display());
            }
        }

        Commands::Cache { clear, info } => {
            let cache_path = CacheFile::cache_path(&data_dir);

            if info || !clear {
                if cache_path.exists() {
                    let cache = CacheFile::load(&data_dir);
                    println!("キャッシュ情報:");
                    println!("  パス: {}", cache_path.display());
                    println!("  件数: {}", cache.len());
                    if let Ok(meta) = std::fs::metadata(&cache_path) {
                        println!("  サイズ: {} bytes", meta.len());
                    }
                } else {
                    println!("キャッシュファイルが存在しません: {}", cache_path.display());
                }
            }

            if clear {
                if CacheFile::clear(&data_dir)? {
                    println!("✔ キャッシュを削除しました: {}", cache_path.display());
                } else {
                    println!("キャッシュファイルが存在しません");
                }
            }
        }
    }

    Ok(())
}

fn open_store(data_dir: &Path) -> Result<AssetStore<JsonFileRepository>> {
    let repo = JsonFileRepository::in_dir(data_dir);
    let path = repo.path().display().to_string();
    AssetStore::open(repo).with_context(|| format!("資産台帳を開けません: {}", path))
}

fn http_client(config: &Config) -> Result<HttpAnalysisClient> {
    Ok(HttpAnalysisClient::new(&config.api_base_url()?, config.api_key())?)
}

fn run_assess(config: &Config, paths: &[PathBuf], json: bool, recursive: bool) -> Result<()> {
    let images = scanner::collect_images(paths, recursive)?;
    if images.is_empty() {
        let joined: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
        return Err(GymAssetError::NoImagesFound(joined.join(", ")).into());
    }

    if !json {
        println!("🔍 gym-asset - 画質チェック\n");
        println!("✔ {}枚の画像を検出\n", images.len());
    }

    let (max_dimension, jpeg_quality) = (config.max_image_dimension, config.jpeg_quality);
    let results: Vec<_> = images
        .par_iter()
        .map(|info| {
            let metrics = scanner::prepare_image(&info.path, max_dimension, jpeg_quality)
                .and_then(|prepared| prepared.assess());
            (info, metrics)
        })
        .collect();

    if json {
        let entries: Vec<serde_json::Value> = results
            .iter()
            .map(|(info, metrics)| match metrics {
                Ok(m) => serde_json::json!({
                    "file": info.path.display().to_string(),
                    "capturedAt": info.captured_at.map(|t| t.to_string()),
                    "metrics": m,
                }),
                Err(e) => serde_json::json!({
                    "file": info.path.display().to_string(),
                    "error": e.to_string(),
                }),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let mut failures = 0;
    for (info, metrics) in &results {
        println!("■ {}", info.file_name);
        match metrics {
            Ok(m) => print_metrics(m),
            Err(e) => {
                failures += 1;
                println!("  ✖ {}", e);
            }
        }
        println!();
    }

    println!("✅ {}枚を評価（失敗 {}枚）", results.len() - failures, failures);
    Ok(())
}

fn print_metrics(m: &ImageQualityMetrics) {
    println!(
        "  解像度: {}x{} ({:.2}MP)",
        m.resolution.width, m.resolution.height, m.resolution.megapixels
    );
    println!(
        "  明るさ: {} / コントラスト: {} / シャープネス: {}",
        m.brightness, m.contrast, m.sharpness
    );
    println!("  品質: {} ({}/12)", m.quality.label(), m.score.total());
    for rec in &m.recommendations {
        println!("  💡 {}", rec);
    }
}

fn print_payload(payload: &AnalysisPayload) {
    println!("検出: {}件 (信頼度 {:.0}%)", payload.total_items, payload.confidence_score * 100.0);
    for (i, item) in payload.equipment.iter().enumerate() {
        let weight = item.weight.as_deref().map(|w| format!(" {}", w)).unwrap_or_default();
        println!("  {}. {}{} [{}]", i + 1, item.equipment_type, weight, item.condition);
        if !item.description.is_empty() {
            println!("     {}", item.description);
        }
    }
    for rec in &payload.recommendations {
        println!("  💡 {}", rec);
    }
}

fn poll_spinner() -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(120));
    Ok(spinner)
}

async fn run_scan(
    config: &Config,
    data_dir: &Path,
    image: &Path,
    no_wait: bool,
    review: bool,
    use_cache: bool,
) -> Result<()> {
    println!("[1/3] 画像を準備中...");
    let prepared = scanner::prepare_image(image, config.max_image_dimension, config.jpeg_quality)?;
    if prepared.was_resized() {
        let (w, h) = prepared.rgba.dimensions();
        println!("- {}x{} → {}x{} に縮小", prepared.original_size.0, prepared.original_size.1, w, h);
    }
    let metrics = match prepared.assess() {
        Ok(m) => {
            print_metrics(&m);
            Some(m)
        }
        Err(e) => {
            println!("⚠ 画質チェックをスキップ: {}", e);
            None
        }
    };
    println!();

    let hash = analyzer::compute_hash(&prepared.jpeg);
    let mut store = open_store(data_dir)?;

    if use_cache {
        let cache = CacheFile::load(data_dir);
        if let Some(hit) = cache.get(&hash).cloned() {
            println!("✔ キャッシュを使用（ジョブID {}）\n", hit.job_id);
            print_payload(&hit.payload);
            if review {
                review_suggestions(&mut store, &hit.payload, &hit.job_id, image)?;
            }
            return Ok(());
        }
    }

    let client = http_client(config)?;
    let upload = UploadImage::jpeg(prepared.file_name.clone(), prepared.jpeg.clone());

    if no_wait {
        println!("[2/3] 解析APIに送信中...");
        let submitted = client.submit_image(&upload).await?;
        println!("✔ 送信完了: ジョブID {}", submitted.job_id);
        println!("  `gym-asset status {} --wait` で結果を確認できます", submitted.job_id);
        return Ok(());
    }

    println!("[2/3] AI解析中...（Ctrl-Cで中止）");
    let cancel = CancellationToken::new();
    let ctrl_c = CtrlCHandler::spawn(cancel.clone());

    let spinner = poll_spinner()?;
    let observer = |event: &PollEvent| {
        if let PollEvent::Status { attempt, status } = event {
            spinner.set_message(format!("{}（{}回目）", status.label(), attempt));
        }
    };
    let run = with_spinner(
        &spinner,
        analyzer::analyze_image(&client, &upload, config.poll_policy(), cancel, &observer),
    )
    .await;
    ctrl_c.disarm();
    let run = run?;

    match run.outcome {
        PollOutcome::Completed(payload) => {
            println!("✔ 解析完了\n");
            print_payload(&payload);

            println!("\n[3/3] 結果を保存中...");
            let stored = StoredAnalysisResult {
                job_id: run.job_id.clone(),
                image_file: prepared.file_name.clone(),
                image_hash: hash.clone(),
                image_quality: metrics,
                analyzed_at: Utc::now(),
                payload,
            };
            store.record_analysis(stored.clone())?;

            let mut cache = CacheFile::load(data_dir);
            cache.insert(hash, prepared.file_name.clone(), prepared.jpeg.len() as u64, stored.clone());
            cache.save(data_dir)?;
            println!("✔ 解析結果を保存しました");

            if review {
                review_suggestions(&mut store, &stored.payload, &run.job_id, image)?;
            } else {
                println!("  `--review` を付けると検出結果を資産登録できます");
            }
            println!("\n✅ スキャン完了");
        }
        PollOutcome::Failed(reason) => {
            return Err(GymAssetError::Analysis(reason.to_string()).into());
        }
        PollOutcome::Cancelled => {
            println!("⏹ 中止しました（ジョブID {}）", run.job_id);
        }
    }

    Ok(())
}

async fn run_status(config: &Config, job_id: &str, wait: bool) -> Result<()> {
    let client = http_client(config)?;

    if !wait {
        let response = client.job_status(job_id).await?;
        println!("ジョブ {}: {}", response.id, response.status.label());
        match response.status {
            JobStatus::Completed => {
                if let Some(payload) = &response.result {
                    print_payload(payload);
                }
            }
            JobStatus::Failed => {
                if let Some(message) = &response.error_message {
                    println!("  ✖ {}", message);
                }
            }
            JobStatus::Pending | JobStatus::Processing => {}
        }
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let ctrl_c = CtrlCHandler::spawn(cancel.clone());

    let spinner = poll_spinner()?;
    let observer = |event: &PollEvent| {
        if let PollEvent::Status { attempt, status } = event {
            spinner.set_message(format!("{}（{}回目）", status.label(), attempt));
        }
    };
    let poller = JobPoller::new(&client, config.poll_policy()).with_cancellation(cancel);
    let outcome = with_spinner(&spinner, poller.run(job_id, &observer)).await;
    ctrl_c.disarm();

    match outcome {
        PollOutcome::Completed(payload) => {
            println!("✔ 解析完了\n");
            print_payload(&payload);
            Ok(())
        }
        PollOutcome::Failed(reason) => Err(GymAssetError::Analysis(reason.to_string()).into()),
        PollOutcome::Cancelled => {
            println!("⏹ 中止しました");
            Ok(())
        }
    }
}

/// 検出結果から資産候補を作り、1件ずつ確認して登録
fn review_suggestions<R: AssetRepository>(
    store: &mut AssetStore<R>,
    payload: &AnalysisPayload,
    job_id: &str,
    image: &Path,
) -> Result<()> {
    let image_path = image.display().to_string();
    let drafts = suggest_assets(payload, job_id, Some(&image_path));
    if drafts.is_empty() {
        println!("登録候補はありません");
        return Ok(());
    }

    println!("\n📝 登録候補: {}件", drafts.len());
    let mut created = 0;
    for draft in drafts {
        if store.get(&draft.asset_tag).is_some() {
            println!("- {} は登録済みのためスキップ", draft.asset_tag);
            continue;
        }

        let prompt = format!("{} [{}] ({}) を登録しますか？", draft.name, draft.asset_tag, draft.condition);
        if !Confirm::new().with_prompt(prompt).default(true).interact()? {
            continue;
        }

        match store.create(draft) {
            Ok(asset) => {
                println!("✔ 登録: {}", asset.asset_tag);
                created += 1;
            }
            Err(e) => println!("⚠ 登録できません: {}", e),
        }
    }

    println!("✔ {}件を登録しました", created);
    Ok(())
}

fn run_asset<R: AssetRepository>(store: &mut AssetStore<R>, action: AssetCommand) -> Result<()> {
    match action {
        AssetCommand::Add { tag, name, equipment_type, location, condition, weight, notes } => {
            let asset = store.create(AssetDraft {
                asset_tag: tag,
                name,
                equipment_type,
                location,
                condition,
                weight,
                notes,
                ..Default::default()
            })?;
            println!("✔ 登録しました: {} ({})", asset.asset_tag, asset.name);
        }

        AssetCommand::Update { tag, name, equipment_type, location, condition, status, weight, notes } => {
            let update = AssetUpdate {
                name,
                equipment_type,
                location,
                condition,
                status,
                weight,
                notes,
            };
            if update.is_empty() {
                println!("変更する項目が指定されていません");
                return Ok(());
            }
            let asset = store.update(&tag, &update)?;
            println!("✔ 更新しました: {}", asset.asset_tag);
        }

        AssetCommand::Delete { tag, yes } => {
            let Some(asset) = store.get(&tag) else {
                return Err(GymAssetError::AssetNotFound(tag).into());
            };
            let prompt = format!("{} ({}) を削除しますか？", asset.asset_tag, asset.name);
            if !yes && !Confirm::new().with_prompt(prompt).default(false).interact()? {
                println!("中止しました");
                return Ok(());
            }
            let asset = store.delete(&tag)?;
            println!("✔ 削除しました: {}", asset.asset_tag);
        }

        AssetCommand::Show { tag } => {
            let asset = store
                .get(&tag)
                .ok_or_else(|| GymAssetError::AssetNotFound(tag.clone()))?;
            print_asset_detail(asset);

            let logs = store.audit_logs(Some(&tag));
            if !logs.is_empty() {
                println!("\n  履歴:");
                for log in logs {
                    println!("    {} {:<6} {}", log.timestamp.format("%Y-%m-%d %H:%M"), log.action, log.details);
                }
            }
        }

        AssetCommand::List { filter } => {
            print_asset_table(&store.search(&filter.into_filter(None)));
        }

        AssetCommand::Search { query, filter } => {
            let filter: AssetFilter = filter.into_filter(Some(query));
            print_asset_table(&store.search(&filter));
        }
    }

    Ok(())
}

fn print_asset_detail(asset: &Asset) {
    println!("{} - {}", asset.asset_tag, asset.name);
    println!("  種別: {}", asset.equipment_type);
    println!("  設置場所: {}", asset.location);
    println!("  状態: {}", asset.condition);
    println!("  稼働状況: {}", asset.status);
    if let Some(weight) = &asset.weight {
        println!("  重量: {}", weight);
    }
    if !asset.notes.is_empty() {
        println!("  メモ: {}", asset.notes);
    }
    if let Some(path) = &asset.image_path {
        println!("  画像: {}", path);
    }
    if let Some(job_id) = &asset.source_job_id {
        println!("  解析ジョブ: {}", job_id);
    }
    println!("  登録: {}", asset.created_at.format("%Y-%m-%d %H:%M"));
    println!("  更新: {}", asset.updated_at.format("%Y-%m-%d %H:%M"));
}

fn print_asset_table(assets: &[&Asset]) {
    if assets.is_empty() {
        println!("該当する資産はありません");
        return;
    }
    for asset in assets {
        let flag = if asset.needs_attention() { "⚠" } else { " " };
        println!(
            "{} {:<16} {:<24} {:<12} {:<12} {}",
            flag, asset.asset_tag, asset.name, asset.equipment_type, asset.condition, asset.status
        );
    }
    println!("\n{}件", assets.len());
}
