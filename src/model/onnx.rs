//! ONNX export of the fitted preprocessing + classifier pipeline.
//!
//! The graph takes one `[1, 1]` input per column, named and ordered exactly as
//! in [`SCHEMA`]: string tensors for categorical columns, a numeric tensor for
//! integer columns. The first graph output is the predicted label.

use std::path::{Path, PathBuf};

use tract_onnx::prelude::*;
use tracing::{debug, info};

use super::Classifier;
use crate::domain::{FieldValue, IncomeClass, PredictionRequest, RequestCell};
use crate::error::PredictError;
use crate::schema::{FIELD_COUNT, FieldSpec, SCHEMA};

type RunnablePipeline = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// How a column is fed to the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputKind {
    Text,
    Numeric(DatumType),
}

#[derive(Debug, Clone, Copy)]
struct BoundInput {
    column: &'static str,
    kind: InputKind,
}

/// A loaded, optimized pipeline. Immutable once built.
pub struct OnnxPipeline {
    plan: RunnablePipeline,
    inputs: Vec<BoundInput>,
    path: PathBuf,
}

impl std::fmt::Debug for OnnxPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxPipeline")
            .field("path", &self.path)
            .field("inputs", &self.inputs)
            .finish_non_exhaustive()
    }
}

impl OnnxPipeline {
    /// Read, check, and optimize the artifact.
    ///
    /// Load failures are [`PredictError::ArtifactLoad`]; a graph whose inputs
    /// disagree with [`SCHEMA`] is [`PredictError::InferenceSchema`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PredictError> {
        let path = path.as_ref();
        let meta = std::fs::metadata(path).map_err(|e| PredictError::artifact(path, e.to_string()))?;
        if !meta.is_file() {
            return Err(PredictError::artifact(path, "not a regular file"));
        }

        let model = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|m| m.into_typed())
            .map_err(|e| PredictError::artifact(path, format!("{e:#}")))?;

        let names = input_names(&model).map_err(|e| PredictError::artifact(path, format!("{e:#}")))?;
        check_input_names(&names)?;

        let mut inputs = Vec::with_capacity(FIELD_COUNT);
        for (ix, spec) in SCHEMA.iter().enumerate() {
            let declared = model
                .input_fact(ix)
                .map_err(|e| PredictError::artifact(path, format!("{e:#}")))?
                .datum_type;
            inputs.push(BoundInput {
                column: spec.column,
                kind: bind_input(spec, declared)?,
            });
        }

        let plan = model
            .into_optimized()
            .and_then(|m| m.into_runnable())
            .map_err(|e| PredictError::artifact(path, format!("{e:#}")))?;

        info!(path = %path.display(), inputs = inputs.len(), "loaded ONNX pipeline");
        Ok(Self {
            plan,
            inputs,
            path: path.to_path_buf(),
        })
    }
}

impl Classifier for OnnxPipeline {
    fn predict(&self, request: &PredictionRequest) -> Result<IncomeClass, PredictError> {
        if request.len() != self.inputs.len() {
            return Err(PredictError::schema(format!(
                "request has {} columns, pipeline expects {}",
                request.len(),
                self.inputs.len()
            )));
        }

        let mut tensors: TVec<TValue> = tvec!();
        for (cell, input) in request.cells().iter().zip(&self.inputs) {
            tensors.push(cell_tensor(cell, input)?.into());
        }

        let outputs = self
            .plan
            .run(tensors)
            .map_err(|e| PredictError::schema(format!("inference failed: {e:#}")))?;
        let label = outputs
            .first()
            .ok_or_else(|| PredictError::schema("pipeline produced no outputs"))?;

        let raw = read_label(label)?;
        debug!(raw, "pipeline label");
        IncomeClass::from_label(raw).ok_or_else(|| PredictError::schema(format!("label {raw} is not 0 or 1")))
    }

    fn describe(&self) -> String {
        format!("ONNX pipeline {}", self.path.display())
    }
}

fn input_names(model: &TypedModel) -> TractResult<Vec<String>> {
    Ok(model
        .input_outlets()?
        .iter()
        .map(|outlet| model.node(outlet.node).name.clone())
        .collect())
}

/// Graph inputs must be the schema columns, in order.
fn check_input_names(names: &[String]) -> Result<(), PredictError> {
    if names.len() != FIELD_COUNT {
        return Err(PredictError::schema(format!(
            "artifact declares {} inputs, expected {FIELD_COUNT}",
            names.len()
        )));
    }
    for (ix, (name, spec)) in names.iter().zip(SCHEMA.iter()).enumerate() {
        if name != spec.column {
            return Err(PredictError::schema(format!(
                "input {ix} is '{name}', expected '{}'",
                spec.column
            )));
        }
    }
    Ok(())
}

fn bind_input(spec: &FieldSpec, declared: DatumType) -> Result<InputKind, PredictError> {
    match (spec.is_categorical(), declared) {
        (true, DatumType::String) => Ok(InputKind::Text),
        (false, dt @ (DatumType::I64 | DatumType::I32 | DatumType::F32 | DatumType::F64)) => {
            Ok(InputKind::Numeric(dt))
        }
        (true, other) => Err(PredictError::schema(format!(
            "column '{}' is categorical but the artifact declares {other:?}",
            spec.column
        ))),
        (false, other) => Err(PredictError::schema(format!(
            "column '{}' is numeric but the artifact declares {other:?}",
            spec.column
        ))),
    }
}

fn cell_tensor(cell: &RequestCell, input: &BoundInput) -> Result<Tensor, PredictError> {
    if cell.column != input.column {
        return Err(PredictError::schema(format!(
            "request column '{}' where the pipeline expects '{}'",
            cell.column, input.column
        )));
    }

    match (input.kind, cell.value) {
        (InputKind::Text, FieldValue::Category(label)) => Ok(tract_ndarray::arr2(&[[label.to_string()]]).into_tensor()),
        (InputKind::Numeric(dt), FieldValue::Integer(v)) => tract_ndarray::arr2(&[[v]])
            .into_tensor()
            .cast_to_dt(dt)
            .map(|t| t.into_owned())
            .map_err(|e| PredictError::schema(format!("cannot cast '{}' to {dt:?}: {e:#}", cell.column))),
        (kind, value) => Err(PredictError::schema(format!(
            "column '{}' holds {value:?} but is bound as {kind:?}",
            cell.column
        ))),
    }
}

/// Read the first element of the label output as an integer class id.
///
/// Integer, boolean and symbolic (`TDim`) outputs are cast to `i64`. Float
/// and string labels must hold an exact integer.
fn read_label(label: &Tensor) -> Result<i64, PredictError> {
    let unreadable = |e: TractError| PredictError::schema(format!("unreadable label output: {e:#}"));

    let dt = label.datum_type();
    let raw = if dt.is_float() {
        let wide = label.cast_to::<f64>().map_err(unreadable)?;
        wide.as_slice::<f64>().map_err(unreadable)?.first().and_then(|v| integral(*v))
    } else if dt == DatumType::String {
        label
            .as_slice::<String>()
            .map_err(unreadable)?
            .first()
            .and_then(|s| s.trim().parse::<i64>().ok())
    } else {
        let ints = label
            .cast_to::<i64>()
            .map_err(|e| PredictError::schema(format!("unsupported label type {dt:?}: {e:#}")))?;
        ints.as_slice::<i64>().map_err(unreadable)?.first().copied()
    };

    raw.ok_or_else(|| PredictError::schema("label output is empty or not an integer class"))
}

fn integral(v: f64) -> Option<i64> {
    (v.is_finite() && v.fract() == 0.0).then_some(v as i64)
}

#[cfg(test)]
pub(crate) mod fixture {
    //! Hand-built ONNX graphs over the schema inputs.

    use std::path::{Path, PathBuf};

    use prost::Message;
    use tract_onnx::pb;
    use tract_onnx::pb::tensor_proto::DataType;

    use crate::schema::SCHEMA;

    pub fn schema_columns() -> Vec<&'static str> {
        SCHEMA.iter().map(|f| f.column).collect()
    }

    fn one_by_one(name: &str, elem: DataType) -> pb::ValueInfoProto {
        let dim = || pb::tensor_shape_proto::Dimension {
            value: Some(pb::tensor_shape_proto::dimension::Value::DimValue(1)),
            ..Default::default()
        };
        pb::ValueInfoProto {
            name: name.to_string(),
            r#type: Some(pb::TypeProto {
                value: Some(pb::type_proto::Value::TensorType(pb::type_proto::Tensor {
                    elem_type: elem as i32,
                    shape: Some(pb::TensorShapeProto { dim: vec![dim(), dim()] }),
                })),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn node(op: &str, inputs: &[&str], output: &str, attribute: Vec<pb::AttributeProto>) -> pb::NodeProto {
        pb::NodeProto {
            input: inputs.iter().map(|s| s.to_string()).collect(),
            output: vec![output.to_string()],
            name: format!("{output}_node"),
            op_type: op.to_string(),
            attribute,
            ..Default::default()
        }
    }

    /// `label = Cast(Less(age, hours.per.week), to=INT64)`.
    ///
    /// One input per entry of `input_names`, typed after the matching schema
    /// column: string for categorical, `numeric` otherwise.
    pub fn age_below_hours(input_names: &[&str], numeric: DataType) -> Vec<u8> {
        let input = SCHEMA
            .iter()
            .zip(input_names)
            .map(|(spec, name)| {
                let elem = if spec.is_categorical() { DataType::String } else { numeric };
                one_by_one(name, elem)
            })
            .collect();
        let to_int64 = pb::AttributeProto {
            name: "to".to_string(),
            r#type: pb::attribute_proto::AttributeType::Int as i32,
            i: DataType::Int64 as i64,
            ..Default::default()
        };
        let graph = pb::GraphProto {
            name: "age_below_hours".to_string(),
            node: vec![
                node("Less", &[input_names[0], input_names[11]], "younger", vec![]),
                node("Cast", &["younger"], "label", vec![to_int64]),
            ],
            input,
            output: vec![one_by_one("label", DataType::Int64)],
            ..Default::default()
        };
        pb::ModelProto {
            ir_version: 7,
            opset_import: vec![pb::OperatorSetIdProto {
                domain: String::new(),
                version: 13,
            }],
            producer_name: "income-form tests".to_string(),
            graph: Some(graph),
            ..Default::default()
        }
        .encode_to_vec()
    }

    pub fn write(dir: &Path, bytes: &[u8]) -> PathBuf {
        let path = dir.join("gradient_boosting_v1.onnx");
        std::fs::write(&path, bytes).unwrap();
        path
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tract_onnx::pb::tensor_proto::DataType as OnnxType;

    use super::fixture::{age_below_hours, schema_columns, write};
    use super::*;
    use crate::schema::field;

    fn default_request() -> PredictionRequest {
        PredictionRequest::from_values(std::array::from_fn(|i| SCHEMA[i].domain.default_value()))
    }

    fn request_with_age(age: i64) -> PredictionRequest {
        let mut values = std::array::from_fn(|i| SCHEMA[i].domain.default_value());
        values[0] = FieldValue::Integer(age);
        PredictionRequest::from_values(values)
    }

    #[test]
    fn missing_artifact_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = OnnxPipeline::load(dir.path().join("gradient_boosting_v1.onnx")).unwrap_err();
        assert!(matches!(err, PredictError::ArtifactLoad { .. }));
    }

    #[test]
    fn directory_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = OnnxPipeline::load(dir.path()).unwrap_err();
        assert!(matches!(err, PredictError::ArtifactLoad { ref reason, .. } if reason.contains("regular file")));
    }

    #[test]
    fn corrupt_artifact_is_a_load_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"\x80\x04\x95joblib pickle, not onnx").unwrap();
        let err = OnnxPipeline::load(file.path()).unwrap_err();
        assert!(matches!(err, PredictError::ArtifactLoad { .. }));
    }

    #[test]
    fn input_names_must_match_columns_in_order() {
        let good: Vec<String> = SCHEMA.iter().map(|f| f.column.to_string()).collect();
        assert!(check_input_names(&good).is_ok());

        let mut underscored = good.clone();
        underscored[3] = "education_num".to_string();
        let err = check_input_names(&underscored).unwrap_err();
        assert!(err.to_string().contains("education_num"));

        let mut swapped = good.clone();
        swapped.swap(0, 1);
        assert!(check_input_names(&swapped).is_err());

        assert!(check_input_names(&good[..12]).is_err());
    }

    #[test]
    fn bind_input_requires_string_for_categorical() {
        let race = field("race").unwrap();
        let age = field("age").unwrap();
        assert_eq!(bind_input(race, DatumType::String).unwrap(), InputKind::Text);
        assert!(bind_input(race, DatumType::I64).is_err());
        assert_eq!(bind_input(age, DatumType::F32).unwrap(), InputKind::Numeric(DatumType::F32));
        assert!(bind_input(age, DatumType::String).is_err());
    }

    #[test]
    fn cells_become_one_by_one_tensors() {
        let req = default_request();
        let age = BoundInput {
            column: "age",
            kind: InputKind::Numeric(DatumType::F32),
        };
        let t = cell_tensor(&req.cells()[0], &age).unwrap();
        assert_eq!(t.shape(), &[1, 1]);
        assert_eq!(t.datum_type(), DatumType::F32);
        assert_eq!(t.as_slice::<f32>().unwrap(), &[30.0]);

        let workclass = BoundInput {
            column: "workclass",
            kind: InputKind::Text,
        };
        let t = cell_tensor(&req.cells()[1], &workclass).unwrap();
        assert_eq!(t.as_slice::<String>().unwrap(), &["Private".to_string()]);

        assert!(cell_tensor(&req.cells()[0], &workclass).is_err());
    }

    #[test]
    fn labels_are_read_from_common_output_types() {
        assert_eq!(read_label(&tract_ndarray::arr1(&[1i64]).into_tensor()).unwrap(), 1);
        assert_eq!(read_label(&tract_ndarray::arr1(&[0i32]).into_tensor()).unwrap(), 0);
        assert_eq!(read_label(&tract_ndarray::arr1(&[1.0f32]).into_tensor()).unwrap(), 1);
        assert_eq!(read_label(&tract_ndarray::arr1(&["0".to_string()]).into_tensor()).unwrap(), 0);
        assert!(read_label(&tract_ndarray::arr1(&[0.5f64]).into_tensor()).is_err());
        assert!(read_label(&tract_ndarray::arr1(&[">50K".to_string()]).into_tensor()).is_err());
    }

    #[test]
    fn symbolic_and_boolean_labels_are_cast_to_class_ids() {
        assert_eq!(read_label(&tract_ndarray::arr1(&[TDim::from(1i64)]).into_tensor()).unwrap(), 1);
        assert_eq!(read_label(&tract_ndarray::arr2(&[[TDim::from(0i64)]]).into_tensor()).unwrap(), 0);
        assert_eq!(read_label(&tract_ndarray::arr1(&[true]).into_tensor()).unwrap(), 1);
        assert_eq!(read_label(&tract_ndarray::arr1(&[0u8]).into_tensor()).unwrap(), 0);
    }

    #[test]
    fn int64_cast_output_predicts_through_the_graph() {
        let dir = tempfile::tempdir().unwrap();
        for numeric in [OnnxType::Int64, OnnxType::Float] {
            let path = write(dir.path(), &age_below_hours(&schema_columns(), numeric));
            let pipeline = OnnxPipeline::load(&path).unwrap();

            // Defaults: age 30, 40 hours per week.
            let younger = request_with_age(30);
            assert_eq!(pipeline.predict(&younger).unwrap(), IncomeClass::AboveThreshold);
            assert_eq!(pipeline.predict(&younger).unwrap(), IncomeClass::AboveThreshold);
            assert_eq!(pipeline.predict(&request_with_age(50)).unwrap(), IncomeClass::AtOrBelowThreshold);
        }
    }

    #[test]
    fn underscored_input_name_fails_at_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut names = schema_columns();
        names[3] = "education_num";
        let path = write(dir.path(), &age_below_hours(&names, OnnxType::Int64));
        let err = OnnxPipeline::load(&path).unwrap_err();
        assert!(matches!(err, PredictError::InferenceSchema(ref msg) if msg.contains("education_num")));
    }
}
