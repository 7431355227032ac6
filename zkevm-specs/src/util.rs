pub use gadgets::util::Expr;
