//! Command-line entry point for browsing the catalog.
//!
//! Boots the core from `CHILLAX_*` environment configuration and prints the
//! result of one catalog query.

use chillax_core::{
    init_from_config, open_repository, AppConfig, ArticleView, NewsService, Repository,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::info;
use std::error::Error;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "chillax")]
#[command(about = "Browse the Chillax movie catalog")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print catalog counts and the first/last articles
    Summary,
    /// Print one article with its tags and comments
    Article { id: i64 },
    /// Print articles published on a date (YYYY-MM-DD)
    Date { date: NaiveDate },
    /// Print the articles carrying a tag
    Tag { name: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("chillax: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), Box<dyn Error>> {
    let config = AppConfig::from_env()?;
    init_from_config(&config)?;
    let repo = open_repository(&config)?;
    info!("event=cli_start module=cli status=ok command={command:?}");

    match command {
        Command::Summary => summary(repo),
        Command::Article { id } => {
            let news = NewsService::new(repo);
            print_article(&news.get_article(id)?);
            Ok(())
        }
        Command::Date { date } => {
            let news = NewsService::new(repo);
            let page = news.get_articles_by_date(date)?;
            if page.articles.is_empty() {
                println!("no articles on {date}");
            }
            for article in &page.articles {
                print_article(article);
            }
            println!(
                "previous={} next={}",
                format_date(page.previous_date),
                format_date(page.next_date)
            );
            Ok(())
        }
        Command::Tag { name } => {
            let news = NewsService::new(repo);
            let ids = news.get_article_ids_for_tag(&name)?;
            for article in news.get_articles_by_id(&ids)? {
                println!("{:>4}  {}  {}", article.id, article.date, article.title);
            }
            Ok(())
        }
    }
}

fn summary(repo: Box<dyn Repository>) -> Result<(), Box<dyn Error>> {
    println!("articles={}", repo.get_number_of_articles()?);
    println!("tags={}", repo.get_tags()?.len());
    println!("comments={}", repo.get_comments()?.len());

    let news = NewsService::new(repo);
    if let Some(first) = news.get_first_article()? {
        println!("first={} {}", first.date, first.title);
    }
    if let Some(last) = news.get_last_article()? {
        println!("last={} {}", last.date, last.title);
    }
    Ok(())
}

fn print_article(article: &ArticleView) {
    println!("[{}] {} ({})", article.id, article.title, article.date);
    println!("{}", article.first_para);
    println!("{}", article.hyperlink);
    let tags: Vec<&str> = article.tags.iter().map(|tag| tag.name.as_str()).collect();
    println!("tags: {}", tags.join(", "));
    for comment in &article.comments {
        println!(
            "  {} @ {}: {}",
            comment.username, comment.timestamp, comment.comment_text
        );
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| "-".to_string(), |date| date.to_string())
}
