//! Bio-Formats reader reached over JNI.
//!
//! Every method attaches the calling thread to the JVM for good (a no-op for
//! threads already attached) and runs inside a local reference frame, so pool
//! threads neither re-attach per call nor accumulate local references. Pending
//! Java exceptions become [`BridgeError::Java`] carrying the exception's
//! `toString()`.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use jni::objects::{GlobalRef, JByteArray, JObject, JString, JValue};
use jni::JNIEnv;
use tracing::{debug, info};

use super::reader::{FormatReader, PhysicalAxis};
use super::runtime::Runtime;
use crate::error::BridgeError;

/// Local references a single call may create.
const LOCAL_FRAME_CAPACITY: i32 = 16;

/// A `ChannelSeparator`-wrapped `ImageReader` with an OME-XML metadata store.
pub struct JvmFormatReader {
    runtime: &'static Runtime,
    reader: GlobalRef,
    metadata: GlobalRef,
    path: PathBuf,
}

impl JvmFormatReader {
    /// Construct a reader and bind it to `path` (`setId`).
    pub fn open(runtime: &'static Runtime, path: &Path) -> Result<Self, BridgeError> {
        let open_failed = |reason: String| BridgeError::OpenFailed {
            path: path.to_path_buf(),
            reason,
        };

        if !path.is_file() {
            return Err(open_failed("no such file".to_string()));
        }
        let id = path
            .to_str()
            .ok_or_else(|| open_failed("path is not valid UTF-8".to_string()))?;

        let mut env = runtime.attach()?;

        let bound = env.with_local_frame(
            LOCAL_FRAME_CAPACITY,
            |env| -> jni::errors::Result<(GlobalRef, GlobalRef)> {
                let inner = env.new_object("loci/formats/ImageReader", "()V", &[])?;
                let reader = env.new_object(
                    "loci/formats/ChannelSeparator",
                    "(Lloci/formats/IFormatReader;)V",
                    &[JValue::Object(&inner)],
                )?;
                let metadata = env
                    .call_static_method(
                        "loci/formats/MetadataTools",
                        "createOMEXMLMetadata",
                        "()Lloci/formats/meta/IMetadata;",
                        &[],
                    )?
                    .l()?;
                env.call_method(
                    &reader,
                    "setMetadataStore",
                    "(Lloci/formats/meta/MetadataStore;)V",
                    &[JValue::Object(&metadata)],
                )?;
                let id = env.new_string(id)?;
                env.call_method(
                    &reader,
                    "setId",
                    "(Ljava/lang/String;)V",
                    &[JValue::from(&id)],
                )?;
                Ok((env.new_global_ref(&reader)?, env.new_global_ref(&metadata)?))
            },
        );

        let (reader, metadata) = bound.map_err(|e| open_failed(describe_error(&mut env, e)))?;
        info!("Opened {} with Bio-Formats", path.display());

        Ok(Self {
            runtime,
            reader,
            metadata,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` with an attached env, the reader and the metadata store.
    fn call<T>(
        &self,
        f: impl FnOnce(&mut JNIEnv<'_>, &JObject<'static>, &JObject<'static>) -> jni::errors::Result<T>,
    ) -> Result<T, BridgeError> {
        let mut env = self.runtime.attach()?;
        let reader = self.reader.as_obj();
        let metadata = self.metadata.as_obj();

        env.with_local_frame(LOCAL_FRAME_CAPACITY, |env| f(env, reader, metadata))
            .map_err(|e| BridgeError::Java(describe_error(&mut env, e)))
    }

    fn int_method(&self, name: &'static str) -> Result<i32, BridgeError> {
        self.call(|env, reader, _| env.call_method(reader, name, "()I", &[])?.i())
    }

    fn size_method(&self, name: &'static str) -> Result<u32, BridgeError> {
        let value = self.int_method(name)?;
        u32::try_from(value).map_err(|_| BridgeError::Java(format!("{} returned {}", name, value)))
    }

    fn bool_method(&self, name: &'static str) -> Result<bool, BridgeError> {
        self.call(|env, reader, _| env.call_method(reader, name, "()Z", &[])?.z())
    }
}

fn to_jint(value: u32) -> Result<i32, BridgeError> {
    i32::try_from(value).map_err(|_| BridgeError::Java(format!("{} does not fit a Java int", value)))
}

/// Convert a possibly-null `java.lang.String`.
fn optional_string(env: &mut JNIEnv<'_>, obj: JObject<'_>) -> jni::errors::Result<Option<String>> {
    if obj.is_null() {
        return Ok(None);
    }
    let string = JString::from(obj);
    let value: String = env.get_string(&string)?.into();
    Ok(Some(value))
}

/// Message for a failed JNI call, clearing any pending Java exception.
pub(super) fn describe_error(env: &mut JNIEnv<'_>, err: jni::errors::Error) -> String {
    if !matches!(err, jni::errors::Error::JavaException) {
        return err.to_string();
    }

    let described = env.with_local_frame(4, |env| -> jni::errors::Result<Option<String>> {
        let throwable = env.exception_occurred()?;
        env.exception_clear()?;
        if throwable.is_null() {
            return Ok(None);
        }
        let message = env
            .call_method(&throwable, "toString", "()Ljava/lang/String;", &[])?
            .l()?;
        optional_string(env, message)
    });

    match described {
        Ok(Some(message)) => message,
        _ => {
            let _ = env.exception_clear();
            "Java exception".to_string()
        }
    }
}

impl FormatReader for JvmFormatReader {
    fn size_x(&self) -> Result<u32, BridgeError> {
        self.size_method("getSizeX")
    }

    fn size_y(&self) -> Result<u32, BridgeError> {
        self.size_method("getSizeY")
    }

    fn size_z(&self) -> Result<u32, BridgeError> {
        self.size_method("getSizeZ")
    }

    fn size_c(&self) -> Result<u32, BridgeError> {
        self.size_method("getSizeC")
    }

    fn size_t(&self) -> Result<u32, BridgeError> {
        self.size_method("getSizeT")
    }

    fn is_rgb(&self) -> Result<bool, BridgeError> {
        self.bool_method("isRGB")
    }

    fn rgb_channel_count(&self) -> Result<u32, BridgeError> {
        self.size_method("getRGBChannelCount")
    }

    fn is_little_endian(&self) -> Result<bool, BridgeError> {
        self.bool_method("isLittleEndian")
    }

    fn pixel_type(&self) -> Result<i32, BridgeError> {
        self.int_method("getPixelType")
    }

    fn plane_index(&self, z: u32, c: u32, t: u32) -> Result<u32, BridgeError> {
        let args = [
            JValue::Int(to_jint(z)?),
            JValue::Int(to_jint(c)?),
            JValue::Int(to_jint(t)?),
        ];
        let index = self.call(|env, reader, _| {
            env.call_method(reader, "getIndex", "(III)I", &args)?.i()
        })?;
        u32::try_from(index).map_err(|_| BridgeError::Java(format!("getIndex returned {}", index)))
    }

    fn open_bytes(&self, index: u32) -> Result<Bytes, BridgeError> {
        let index = to_jint(index)?;
        let bytes = self.call(|env, reader, _| {
            let array = env
                .call_method(reader, "openBytes", "(I)[B", &[JValue::Int(index)])?
                .l()?;
            let array = JByteArray::from(array);
            env.convert_byte_array(&array)
        })?;
        Ok(Bytes::from(bytes))
    }

    fn physical_size(&self, axis: PhysicalAxis) -> Result<Option<f64>, BridgeError> {
        let getter = match axis {
            PhysicalAxis::X => "getPixelsPhysicalSizeX",
            PhysicalAxis::Y => "getPixelsPhysicalSizeY",
            PhysicalAxis::Z => "getPixelsPhysicalSizeZ",
        };
        self.call(|env, _, metadata| {
            let length = env
                .call_method(
                    metadata,
                    getter,
                    "(I)Lome/units/quantity/Length;",
                    &[JValue::Int(0)],
                )?
                .l()?;
            if length.is_null() {
                return Ok(None);
            }
            let number = env
                .call_method(&length, "value", "()Ljava/lang/Number;", &[])?
                .l()?;
            if number.is_null() {
                return Ok(None);
            }
            let value = env.call_method(&number, "doubleValue", "()D", &[])?.d()?;
            Ok(Some(value))
        })
    }

    fn image_name(&self) -> Result<Option<String>, BridgeError> {
        self.call(|env, _, metadata| {
            let name = env
                .call_method(
                    metadata,
                    "getImageName",
                    "(I)Ljava/lang/String;",
                    &[JValue::Int(0)],
                )?
                .l()?;
            optional_string(env, name)
        })
    }

    fn channel_name(&self, channel: u32) -> Result<Option<String>, BridgeError> {
        let channel = to_jint(channel)?;
        self.call(|env, _, metadata| {
            let name = env
                .call_method(
                    metadata,
                    "getChannelName",
                    "(II)Ljava/lang/String;",
                    &[JValue::Int(0), JValue::Int(channel)],
                )?
                .l()?;
            optional_string(env, name)
        })
    }

    fn channel_color(&self, channel: u32) -> Result<Option<i32>, BridgeError> {
        let channel = to_jint(channel)?;
        self.call(|env, _, metadata| {
            let color = env
                .call_method(
                    metadata,
                    "getChannelColor",
                    "(II)Lome/xml/model/primitives/Color;",
                    &[JValue::Int(0), JValue::Int(channel)],
                )?
                .l()?;
            if color.is_null() {
                return Ok(None);
            }
            let value = env.call_method(&color, "getValue", "()I", &[])?.i()?;
            Ok(Some(value))
        })
    }

    fn ome_xml(&self) -> Result<String, BridgeError> {
        let xml = self.call(|env, _, metadata| {
            let xml = env
                .call_method(metadata, "dumpXML", "()Ljava/lang/String;", &[])?
                .l()?;
            optional_string(env, xml)
        })?;
        Ok(xml.unwrap_or_default())
    }

    fn close(&self) -> Result<(), BridgeError> {
        debug!("Closing Bio-Formats reader for {}", self.path.display());
        self.call(|env, reader, _| {
            env.call_method(reader, "close", "()V", &[])?;
            Ok(())
        })
    }
}
