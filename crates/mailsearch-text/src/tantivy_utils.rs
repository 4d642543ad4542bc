use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, StopWordFilter, TextAnalyzer, TokenStream};

const STOP_WORDS: &[&str] = &[
	"a","an","and","are","as","at","be","by","for","from","has","he","in","is","it","its","of","on","that","the","to","was","will","with","or","but","not","this","these","they","them","their","there","then","than","so","if","when","where","why","how","what","which","who","whom","whose","can","could","should","would","may","might","must","shall","do","does","did","have","had","having",
];

/// Tokenizer chain shared by document text and keywords so both sides of a
/// BM25 comparison see identical terms.
#[derive(Clone)]
pub struct Analyzer {
	inner: TextAnalyzer,
}

impl Analyzer {
	pub fn new() -> Self {
		let inner = TextAnalyzer::builder(SimpleTokenizer::default())
			.filter(LowerCaser)
			.filter(StopWordFilter::remove(STOP_WORDS.iter().map(|s| s.to_string())))
			.build();
		Self { inner }
	}

	pub fn tokenize(&mut self, text: &str) -> Vec<String> {
		let mut terms = Vec::new();
		let mut stream = self.inner.token_stream(text);
		stream.process(&mut |token| terms.push(token.text.clone()));
		terms
	}
}

impl Default for Analyzer {
	fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lowercases_splits_and_drops_stop_words() {
		let mut analyzer = Analyzer::new();
		assert_eq!(analyzer.tokenize("The Quarterly BUDGET, for Ann@Example.com"), vec!["quarterly", "budget", "ann", "example", "com"]);
	}

	#[test]
	fn blank_text_has_no_terms() {
		assert!(Analyzer::new().tokenize("  \n ").is_empty());
	}
}
