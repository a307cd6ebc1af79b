//! Terminal front-end: classify sentences typed on stdin and keep a history.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use vi_sentiment::history::{HistoryStore, SentimentRecord};
use vi_sentiment::sentiment::{
    Analysis, ModernBertSize, Sentiment, SentimentAnalysisModel, SentimentAnalysisPipeline,
    SentimentAnalysisPipelineBuilder, DEFAULT_PHOBERT_REPO,
};

/// Shorter input is rejected before it reaches the classifier.
const MIN_INPUT_CHARS: usize = 5;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Backend {
    /// PhoBERT (or another RoBERTa classifier, see --model).
    Phobert,
    /// Multilingual ModernBERT, base size.
    ModernbertBase,
    /// Multilingual ModernBERT, large size.
    ModernbertLarge,
}

#[derive(Debug, Parser)]
#[command(author, version, about = "Vietnamese sentence sentiment classifier", long_about = None)]
struct Config {
    /// SQLite file holding the classification history.
    /// Defaults to sentiments.db next to the executable.
    #[arg(long, env = "SENTIMENT_DB")]
    db: Option<PathBuf>,

    /// Classification backend.
    #[arg(long, value_enum, default_value_t = Backend::Phobert)]
    backend: Backend,

    /// Hugging Face repository of the PhoBERT backend's checkpoint.
    #[arg(long, env = "SENTIMENT_MODEL", default_value = DEFAULT_PHOBERT_REPO)]
    model: String,

    /// Run on CPU even if an accelerator is available.
    #[arg(long)]
    cpu: bool,

    /// Number of history rows to show.
    #[arg(long, default_value_t = 50)]
    history_limit: usize,

    /// Print the recent history as JSON and exit.
    #[arg(long)]
    history_json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let config = Config::parse();
    let store = config.db.clone().map(HistoryStore::new).unwrap_or_default();
    tracing::info!(path = %store.path().display(), "using history store");

    if config.history_json {
        let records = store.recent(config.history_limit)?;
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    match config.backend {
        Backend::Phobert => {
            let builder = SentimentAnalysisPipelineBuilder::phobert_from(config.model.as_str());
            run(select_device(builder, config.cpu).build(), &store, &config)
        }
        Backend::ModernbertBase => {
            let builder = SentimentAnalysisPipelineBuilder::modernbert(ModernBertSize::Base);
            run(select_device(builder, config.cpu).build(), &store, &config)
        }
        Backend::ModernbertLarge => {
            let builder = SentimentAnalysisPipelineBuilder::modernbert(ModernBertSize::Large);
            run(select_device(builder, config.cpu).build(), &store, &config)
        }
    }
}

fn select_device<M: SentimentAnalysisModel>(
    builder: SentimentAnalysisPipelineBuilder<M>,
    cpu: bool,
) -> SentimentAnalysisPipelineBuilder<M> {
    if cpu {
        builder.cpu()
    } else {
        builder.auto_device()
    }
}

fn run<M: SentimentAnalysisModel>(
    pipeline: SentimentAnalysisPipeline<M>,
    store: &HistoryStore,
    config: &Config,
) -> anyhow::Result<()> {
    println!("Trợ lý Phân loại Cảm xúc Tiếng Việt");
    println!("Đang tải mô hình...");
    if pipeline.initialize() {
        println!("Mô hình đã được tải thành công!");
    } else {
        println!("Không thể tải mô hình. Các câu nhập vào sẽ không được phân loại.");
    }

    print_history(store, config.history_limit);
    println!();
    println!("Nhập câu tiếng Việt (ví dụ: Hôm nay tôi rất vui).");
    println!("Gõ :history để xem lịch sử, :quit để thoát.");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush().context("failed to flush stdout")?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim_end_matches(['\r', '\n']);

        match input.trim() {
            "" => continue,
            ":quit" | ":q" => break,
            ":history" => {
                print_history(store, config.history_limit);
                continue;
            }
            _ => {}
        }

        if input.chars().count() < MIN_INPUT_CHARS {
            println!("Câu quá ngắn! Vui lòng nhập câu có ý nghĩa (>= {MIN_INPUT_CHARS} ký tự).");
            continue;
        }

        let analysis = pipeline.analyze(input);
        print_analysis(&analysis);

        // Failed classifications are not recorded.
        if let Some(sentiment) = analysis.sentiment() {
            match store.append(&analysis.text, sentiment) {
                Ok(_) => println!("(Đã lưu kết quả vào lịch sử)"),
                Err(e) => println!("Lỗi khi lưu vào CSDL: {e}"),
            }
        }
    }

    Ok(())
}

fn print_analysis(analysis: &Analysis) {
    let prediction = match &analysis.prediction {
        Ok(prediction) => prediction,
        Err(e) => {
            println!("Lỗi phân loại: {e}");
            return;
        }
    };

    let heading = match prediction.sentiment {
        Sentiment::Positive => "Tích cực (POSITIVE)",
        Sentiment::Negative => "Tiêu cực (NEGATIVE)",
        _ => "Trung tính (NEUTRAL)",
    };
    let reason = match prediction.score {
        Some(score) => format!("Điểm tin cậy: {score:.2}"),
        None => format!("Nhãn: {}", prediction.sentiment),
    };

    println!("Kết quả phân loại: {heading}");
    println!("Câu gốc: '{}' | ({reason})", analysis.text);
}

fn print_history(store: &HistoryStore, limit: usize) {
    println!();
    println!("Lịch sử phân loại ({limit} kết quả mới nhất)");

    let records = match store.recent(limit) {
        Ok(records) => records,
        Err(e) => {
            println!("Lỗi khi tải lịch sử: {e}");
            return;
        }
    };

    if records.is_empty() {
        println!("(chưa có dữ liệu)");
        return;
    }

    println!("{:<19} | {:<10} | text", "timestamp", "sentiment");
    for SentimentRecord {
        text,
        sentiment,
        timestamp,
        ..
    } in &records
    {
        println!("{timestamp:<19} | {:<10} | {text}", sentiment.as_str());
    }
}
