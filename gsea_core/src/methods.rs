pub mod gsea;
