use clap::Parser;
use orgchart_common::expansion::ExpansionState;
use orgchart_common::filter::NodeFilter;
use orgchart_common::render::{render, RenderContext};
use orgchart_common::search::{SearchFields, SearchState};
use orgchart_common::tree::OrgTree;
use orgchart_common::types::{HierarchyUpdateRequest, PersonalUpdateRequest, Scalar, UpdateType};
use orgchart_viewer::{api, cli, config, error, export, progress, prompt, view};
use api::{ApiClient, UploadTarget};
use cli::{Cli, Commands};
use config::Config;
use error::{OrgChartError, Result};
use progress::with_spinner;
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("orgchart_viewer={level},orgchart={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// 数値なら数値、それ以外は文字列のID
fn person_id(raw: &str) -> Scalar {
    raw.trim()
        .parse::<i64>()
        .map(Scalar::Int)
        .unwrap_or_else(|_| Scalar::Text(raw.trim().to_string()))
}

/// 引数 → 設定の既定値 → 対話選択 の順でテーブルを決める
async fn resolve_table(client: &ApiClient, config: &Config, table_id: Option<i64>) -> Result<i64> {
    if let Some(id) = table_id.or(config.default_table_id) {
        return Ok(id);
    }
    let folders = with_spinner("フォルダ一覧を取得中...", client.folder_structure()).await?;
    prompt::select_table(&folders)?
        .ok_or_else(|| OrgChartError::InvalidArgument("テーブルが選択されていません".into()))
}

async fn load_tree(client: &ApiClient, table_id: i64) -> Result<OrgTree> {
    let root = with_spinner("組織データを取得中...", client.org_data(table_id))
        .await
        .map_err(|e| e.for_table(table_id))?;
    Ok(OrgTree::from_root(root)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load()?;
    let client = match &cli.api_url {
        Some(url) => ApiClient::new(config::validate_api_url(url)?, Duration::from_secs(config.timeout_seconds))?,
        None => ApiClient::from_config(&config)?,
    };

    match cli.command {
        Commands::Folders => {
            let folders = with_spinner("フォルダ一覧を取得中...", client.folder_structure()).await?;
            print!("{}", view::render_folders(&folders));
        }

        Commands::Show { table_id, search, search_roles, expand_all, collapse_all, org_mode, filter, highlight } => {
            let table_id = resolve_table(&client, &config, table_id).await?;
            let tree = load_tree(&client, table_id).await?;

            let mut expansion = ExpansionState::new();
            if expand_all {
                expansion.expand_all();
            } else if collapse_all {
                expansion.collapse_all();
            }

            let mut search_state = SearchState::new();
            if let Some(term) = search.as_deref() {
                let fields = if search_roles { SearchFields::NAME_AND_ROLE } else { SearchFields::NAME };
                search_state.update(Some(&tree), term, fields);
                // 一致したノードが隠れないように祖先を開く
                for key in search_state.results() {
                    if let Some(id) = tree.id_of(key) {
                        expansion.reveal(&tree, id);
                    }
                }
            }

            let filter = NodeFilter::new(filter);
            let highlighted: HashSet<String> = highlight.into_iter().collect();
            let ctx = RenderContext::new(&expansion)
                .with_search(&search_state)
                .with_highlighted(&highlighted)
                .with_filter(&filter)
                .with_org_mode(org_mode || config.org_mode);

            let pass = render(Some(&tree), &ctx);
            print!("{}", view::render_tree(&pass));
            println!("\n表示 {}/{} ノード", pass.len(), tree.len());
            if let Some(position) = search_state.position_label() {
                println!("検索 \"{}\": {}", search_state.term(), position);
            } else if search.is_some() {
                println!("検索: 該当なし");
            }
        }

        Commands::Search { folder_id, table_id, query, columns } => {
            let response = with_spinner("検索中...", client.search(folder_id, table_id, &query, &columns)).await?;
            print!("{}", view::render_search(&response));
        }

        Commands::Reports { table_id, name } => {
            let tree = load_tree(&client, table_id).await?;
            let id = tree
                .find_by_name(&name)
                .ok_or_else(|| OrgChartError::PersonNotFound(name.clone()))?;
            print!("{}", view::render_reports(&tree, id));
        }

        Commands::Timeline { folder_id, name, table } => {
            let response = with_spinner("履歴を取得中...", client.timeline(folder_id, &name, table)).await?;
            print!("{}", view::render_timeline(&response));
        }

        Commands::Compare { table1_id, table2_id, output, format } => {
            let report = with_spinner("比較中...", client.compare(table1_id, table2_id)).await?;
            print!("{}", view::render_comparison(&report));

            if let Some(output) = output {
                let title = format!("compare_{}_{}", table1_id, table2_id);
                let written = export::export_comparison(&report, &format, &output, &title)?;
                for path in written {
                    println!("✔ 出力: {}", path.display());
                }
            }
        }

        Commands::Upload { file, date, folder_id, folder_name } => {
            chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map_err(|_| OrgChartError::InvalidArgument(format!("日付は YYYY-MM-DD 形式で指定してください: {}", date)))?;
            let extension = file
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_lowercase())
                .unwrap_or_default();
            if extension != "csv" && extension != "xlsx" {
                return Err(OrgChartError::InvalidArgument(format!(
                    "CSVかXLSXのみアップロードできます: {}",
                    file.display()
                )));
            }

            println!("📤 orgchart - アップロード\n");
            let target = UploadTarget { folder_id, folder_name };
            let response = with_spinner("アップロード中...", client.upload(&file, &date, &target)).await?;
            println!("✔ {}", response.message.as_deref().unwrap_or("アップロード完了"));
            if let Some(id) = response.table_id {
                println!("  テーブルID: {}", id);
            }
        }

        Commands::Move { folder_id, table_id, person_id: from, target_person_id, new_role, update_type, yes } => {
            let update_type: UpdateType = update_type.parse().map_err(OrgChartError::InvalidArgument)?;
            let request = HierarchyUpdateRequest {
                person_id: person_id(&from),
                update_type,
                target_person_id: person_id(&target_person_id),
                new_role,
            };

            let message = format!("{} を {} の下へ移します。よろしいですか?", request.person_id, request.target_person_id);
            if !prompt::confirm(&message, yes)? {
                println!("中止しました");
                return Ok(());
            }
            let response = client.update_hierarchy(folder_id, table_id, &request).await?;
            println!("✔ {}", response.message.as_deref().unwrap_or("更新しました"));
        }

        Commands::UpdatePerson { folder_id, query, tables, column, updates, yes } => {
            let mut fields = BTreeMap::new();
            for raw in &updates {
                let (key, value) = cli::parse_assignment(raw).map_err(OrgChartError::InvalidArgument)?;
                fields.insert(key, value);
            }
            let request = PersonalUpdateRequest {
                table_ids: tables,
                search_query: query,
                search_column: column,
                updates: fields,
            };

            let message = format!(
                "{} ({}) を {}個のテーブルで更新します。よろしいですか?",
                request.search_query,
                request.search_column,
                request.table_ids.len()
            );
            if !prompt::confirm(&message, yes)? {
                println!("中止しました");
                return Ok(());
            }
            let response = client.update_person(folder_id, &request).await?;
            println!("✔ {}", response.message.as_deref().unwrap_or("更新しました"));
        }

        Commands::Export { table_id, output, format } => {
            println!("📄 orgchart - エクスポート\n");
            let tree = load_tree(&client, table_id).await?;
            let output = output.unwrap_or_else(|| PathBuf::from("."));
            let title = format!("org_{}", table_id);
            println!("- {} を生成中...", format);
            for path in export::export_tree(&tree, &format, &output, &title)? {
                println!("✔ 出力: {}", path.display());
            }
            println!("\n✅ エクスポート完了 ({}人)", tree.len());
        }

        Commands::Config { set_api_url, set_timeout, set_default_table, show } => {
            let mut config = Config::load()?;
            let mut changed = false;

            if let Some(url) = set_api_url {
                config.set_api_url(url)?;
                println!("✔ APIのURLを設定しました");
                changed = true;
            }
            if let Some(seconds) = set_timeout {
                config.timeout_seconds = seconds;
                println!("✔ タイムアウトを {} 秒にしました", seconds);
                changed = true;
            }
            if let Some(id) = set_default_table {
                config.default_table_id = Some(id);
                println!("✔ 既定のテーブルを {} にしました", id);
                changed = true;
            }
            if changed {
                config.save()?;
            }

            if show || !changed {
                println!("設定:");
                println!("  API URL: {}", config.api_url());
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!(
                    "  既定のテーブル: {}",
                    config.default_table_id.map_or("未設定".to_string(), |id| id.to_string())
                );
                println!("  組織モード: {}", if config.org_mode { "有効" } else { "無効" });
            }
        }
    }

    Ok(())
}
