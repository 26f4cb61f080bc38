//! Validation combinators and user-input parsers
//!
//! Everything the user types or uploads goes through here before it reaches
//! a form or a request: price portfolio files, tags and currency codes.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

pub mod error;
pub mod portfolio;
pub mod tags;
pub mod types;
pub mod validation;

pub use error::ParseError;
pub use types::{PortfolioItem, PortfolioPrice, PortfolioStats, PricePortfolio, Tag};
pub use validation::{JsonKind, Validation};

// ==================== Parser Trait ====================

/// Parser reference type
pub type PortfolioParserRef = Arc<dyn PortfolioParserTrait>;

/// Trait for price portfolio parsers
#[async_trait]
pub trait PortfolioParserTrait: Send + Sync {
    /// Parse and validate portfolio contents
    async fn parse(&self, content: &str) -> Result<PricePortfolio, ParseError>;

    /// Parse a portfolio file from disk
    async fn parse_file(&self, path: PathBuf) -> Result<PricePortfolio, ParseError>;
}

/// Default parser implementation
#[derive(Debug, Default)]
pub struct DefaultPortfolioParser;

#[async_trait]
impl PortfolioParserTrait for DefaultPortfolioParser {
    async fn parse(&self, content: &str) -> Result<PricePortfolio, ParseError> {
        portfolio::parse_contents(content).map_err(ParseError::from)
    }

    async fn parse_file(&self, path: PathBuf) -> Result<PricePortfolio, ParseError> {
        let content = tokio::fs::read_to_string(&path).await?;
        log::debug!("Parsing price portfolio {}", path.display());
        self.parse(&content).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_parse_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"currency": "EUR", "prices": [{{"date": "2019-01-01", "price": 2}}]}}]"#
        )
        .unwrap();
        let parser = DefaultPortfolioParser;
        let portfolio = parser.parse_file(file.path().to_path_buf()).await.unwrap();
        assert_eq!(portfolio[0].prices.len(), 1);
    }

    #[tokio::test]
    async fn test_parse_invalid_json() {
        let parser = DefaultPortfolioParser;
        let err = parser.parse("nope").await.unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson));
        assert_eq!(err.to_string(), "Invalid json!");
    }

    #[tokio::test]
    async fn test_parse_missing_file() {
        let parser = DefaultPortfolioParser;
        let err = parser
            .parse_file(PathBuf::from("/no/such/portfolio.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, ParseError::IoError(_)));
    }
}
