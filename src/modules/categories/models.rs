use libris_db::{Category, NewCategory};
use libris_http::{
    resource::Resource,
    schema::{FieldRule, Schema, ValidatedFields},
    AppError,
};

pub struct CategoryResource {
    schema: Schema,
}

impl CategoryResource {
    pub fn new() -> Self {
        Self {
            schema: Schema::new("category")
                .field(FieldRule::text("name", Category::NAME_MAX_CHARS)),
        }
    }
}

impl Default for CategoryResource {
    fn default() -> Self {
        Self::new()
    }
}

impl Resource for CategoryResource {
    type Entity = Category;

    fn collection(&self) -> &'static str {
        "categories"
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn draft(&self, mut fields: ValidatedFields) -> Result<NewCategory, AppError> {
        Ok(NewCategory {
            name: fields.take_text("name")?,
        })
    }
}
