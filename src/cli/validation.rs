use crate::cli::args::CliArgs;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(n) = args.items_per_page {
        if n == 0 {
            return Err("invalid items-per-page, expected positive integer".to_string());
        }
    }
    if let Some(n) = args.group_size {
        if n == 0 {
            return Err("invalid group-size, expected positive integer".to_string());
        }
    }
    if let Some(n) = args.retries {
        if n == 0 {
            return Err("invalid retries, expected at least 1 attempt".to_string());
        }
    }
    if let Some(page) = args.page {
        if page == 0 {
            return Err("invalid page, pages start at 1".to_string());
        }
    }
    if let Some(raw) = args.url.as_deref() {
        reqwest::Url::parse(raw).map_err(|e| format!("invalid --url '{raw}': {e}"))?;
    }
    if args.url.is_some() && args.file.is_some() {
        return Err("use either --url or --file, not both".to_string());
    }
    if let Some(raw) = args.output_format.as_deref() {
        if crate::output::OutputFormat::parse(raw).is_none() {
            return Err(format!("invalid --output-format '{raw}', expected text or json"));
        }
    }
    let one_shot_only = !args.include.is_empty()
        || !args.exclude.is_empty()
        || args.search.is_some()
        || args.favorites_only
        || args.page.is_some()
        || args.output.is_some();
    if one_shot_only && !args.once {
        return Err(
            "--include/--exclude/--search/--favorites-only/--page/--output require --once"
                .to_string(),
        );
    }
    Ok(())
}
