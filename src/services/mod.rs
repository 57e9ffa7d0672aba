pub mod llm_provider;
pub mod pinyin;
