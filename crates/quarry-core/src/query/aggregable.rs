use crate::{
    error::QueryError,
    query::{Query, pipeline::Pipeline},
    value::{Document, Value},
};

impl Query {
    /// Append a `$group` stage.
    pub fn group(&self, operation: Document) -> Result<Self, QueryError> {
        self.aggregation(|pipeline| pipeline.group(operation))
    }

    /// Append a `$project` stage.
    pub fn project(&self, operation: Document) -> Result<Self, QueryError> {
        self.aggregation(|pipeline| pipeline.project(operation))
    }

    /// Append an `$unwind` stage for a field name or an options document.
    pub fn unwind(&self, field_or_doc: impl Into<Value>) -> Result<Self, QueryError> {
        let field_or_doc = field_or_doc.into();
        if field_or_doc.is_null() {
            return Err(QueryError::missing_argument("unwind"));
        }

        self.aggregation(|pipeline| pipeline.unwind(field_or_doc))
    }

    // The first aggregation call seeds the pipeline with `$match` and the
    // option stages.
    fn aggregation(
        &self,
        stage: impl FnOnce(&mut Pipeline) -> Result<(), QueryError>,
    ) -> Result<Self, QueryError> {
        self.with_change(|query| {
            if !query.aggregating {
                query.pipeline.extend(query.selector.to_pipeline());
                query.pipeline.extend(query.options.to_pipeline());
                query.aggregating = true;
            }
            stage(&mut query.pipeline)
        })
    }
}
