use crate::ast::{parse_expression, Expression};
use crate::error::{Error, EvalError, ParseError};
use log::debug;
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Variable values supplied at evaluation time.
pub type Bindings = HashMap<String, f64>;

/// Number of parsed expressions an [`Evaluator`] keeps around by default.
pub const DEFAULT_CACHE_SIZE: usize = 100;

impl Expression {
    /// Reduces the tree to a number.
    ///
    /// Arithmetic is plain IEEE-754: dividing by zero yields an infinity and an
    /// invalid power yields NaN, neither of which is an error. The only failure
    /// is a variable missing from `bindings`.
    pub fn evaluate(&self, bindings: &Bindings) -> Result<f64, EvalError> {
        match self {
            Expression::Constant(value) => Ok(*value),
            Expression::Variable(name) => {
                bindings
                    .get(name)
                    .copied()
                    .ok_or_else(|| EvalError::UnboundVariable { name: name.clone() })
            }
            Expression::BinaryOp { kind, left, right } => {
                let left_value = left.evaluate(bindings)?;
                let right_value = right.evaluate(bindings)?;
                Ok(kind.apply(left_value, right_value))
            }
        }
    }
}

/// Parses and evaluates expressions, remembering recently parsed trees so that
/// the same text is only parsed once.
pub struct Evaluator {
    cache: Option<LruCache<String, Arc<Expression>>>,
}

impl Evaluator {
    /// Creates a new `Evaluator` with a given maximum cache size. A size of
    /// zero turns caching off.
    pub fn new(max_cache_size: usize) -> Self {
        Self {
            cache: NonZeroUsize::new(max_cache_size).map(LruCache::new),
        }
    }

    /// Parse an expression string into a shared tree, reusing a cached one if
    /// the same text was parsed before. Failed parses are not cached.
    pub fn parse(&mut self, expression: &str) -> Result<Arc<Expression>, ParseError> {
        let Some(cache) = self.cache.as_mut() else {
            return parse_expression(expression).map(Arc::new);
        };

        if let Some(tree) = cache.get(expression) {
            debug!("Cache hit for expression: {}", expression);
            return Ok(Arc::clone(tree));
        }

        debug!("Cache miss for expression: {}", expression);
        let tree = Arc::new(parse_expression(expression)?);
        cache.put(expression.to_string(), Arc::clone(&tree));
        Ok(tree)
    }

    /// Evaluates a given expression string against the provided bindings.
    ///
    /// # Returns
    ///
    /// * `Ok(f64)` if parsing and evaluation succeed.
    /// * `Err(Error::Parse)` or `Err(Error::Eval)` otherwise.
    pub fn evaluate_expression(
        &mut self,
        expression: &str,
        bindings: &Bindings,
    ) -> Result<f64, Error> {
        let tree = self.parse(expression)?;
        Ok(tree.evaluate(bindings)?)
    }

    /// Number of parsed expressions currently cached.
    pub fn cache_len(&self) -> usize {
        self.cache.as_ref().map_or(0, |cache| cache.len())
    }

    pub fn clear_cache(&mut self) {
        if let Some(cache) = self.cache.as_mut() {
            cache.clear();
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}
